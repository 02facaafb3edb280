//! Sequencer threads and their control surface.
//!
//! Per job kind there is one producer thread and one worker per registry slot.
//! A worker only takes jobs for its own slot. The metronome slot's playback
//! worker runs off the queue and drives the tick counter.
//! Every thread holds an `Arc<Shared>` and slot indices, nothing else.

mod controller;
mod playback;
mod producer;

use crate::clock::Metro;
use crate::config::SequencerConfig;
use crate::generator::{Generator, MidiGenerator};
use crate::instrument::{Instrument, InstrumentRegistry};
use crate::notes::{Controller, Program};
use crate::queue::{ControllerJob, JobQueue, PlaybackJob};
use crate::sink::MidiSink;
use crate::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thread_priority::ThreadPriority;

/// What a playback worker is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerPhase {
    AwaitingJob = 0,
    RenderingStep = 1,
    Sleeping = 2,
    EmittingOff = 3,
    BarBoundary = 4,
    DrainingOnStop = 5,
    Stopped = 6,
}

impl From<u8> for WorkerPhase {
    fn from(value: u8) -> Self {
        match value {
            0 => WorkerPhase::AwaitingJob,
            1 => WorkerPhase::RenderingStep,
            2 => WorkerPhase::Sleeping,
            3 => WorkerPhase::EmittingOff,
            4 => WorkerPhase::BarBoundary,
            5 => WorkerPhase::DrainingOnStop,
            _ => WorkerPhase::Stopped,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PhaseCell(AtomicU8);

impl PhaseCell {
    fn new() -> Self {
        Self(AtomicU8::new(WorkerPhase::Stopped as u8))
    }

    #[inline]
    pub(crate) fn set(&self, phase: WorkerPhase) {
        self.0.store(phase as u8, Ordering::Release);
    }

    #[inline]
    pub(crate) fn get(&self) -> WorkerPhase {
        WorkerPhase::from(self.0.load(Ordering::Acquire))
    }
}

/// State handed to every sequencer thread.
pub(crate) struct Shared {
    pub(crate) config: SequencerConfig,
    pub(crate) registry: InstrumentRegistry,
    pub(crate) metro: Metro,
    pub(crate) playback: JobQueue<PlaybackJob>,
    pub(crate) controllers: JobQueue<ControllerJob>,
    pub(crate) generator: Arc<dyn Generator>,
    pub(crate) phases: Vec<PhaseCell>,
}

impl Shared {
    pub(crate) fn new(config: SequencerConfig, generator: Arc<dyn Generator>) -> Self {
        let registry = InstrumentRegistry::new(config.voices);
        let slots = registry.len();
        let metro = Metro::new(slots, config.default_bpm, registry.tick_counter());
        Self {
            playback: JobQueue::new(config.queue_capacity),
            controllers: JobQueue::new(config.queue_capacity),
            phases: (0..slots).map(|_| PhaseCell::new()).collect(),
            registry,
            metro,
            generator,
            config,
        }
    }
}

/// Multi-voice MIDI sequencer.
///
/// Owns the instrument registry, the clock and both job queues. `start()` spawns
/// the producer and worker threads against a [`MidiSink`], `stop()` joins them.
pub struct Sequencer {
    shared: Arc<Shared>,
    threads: Vec<JoinHandle<()>>,
    sink: Option<Arc<dyn MidiSink>>,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Result<Self> {
        let generator = Arc::new(MidiGenerator::new(config.rest_note));
        Self::with_generator(config, generator)
    }

    pub fn with_generator(config: SequencerConfig, generator: Arc<dyn Generator>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config, generator)),
            threads: Vec::new(),
            sink: None,
        })
    }

    // ==================== Lifecycle ====================

    /// Reset to silence and start playing into `sink`.
    ///
    /// Does nothing (with a warning) if already running.
    pub fn start(&mut self, sink: Arc<dyn MidiSink>) -> Result<()> {
        if self.is_running() {
            tracing::warn!("Sequencer already running, ignoring start");
            return Ok(());
        }

        let shared = &self.shared;
        shared.registry.reset();
        shared.metro.reset(shared.config.default_bpm);
        shared.playback.start();
        shared.controllers.start();
        shared.metro.start();

        if let Err(e) = self.spawn_threads(&sink) {
            self.halt();
            return Err(e);
        }
        self.sink = Some(sink);

        tracing::info!(
            "Sequencer started: {} voices at {} BPM ({} threads)",
            self.shared.config.voices,
            self.shared.metro.tempo(),
            self.threads.len()
        );
        Ok(())
    }

    /// Stop all threads. Sounding notes get their note-off before workers exit.
    pub fn stop(&mut self) {
        if self.threads.is_empty() && !self.is_running() {
            return;
        }
        self.halt();
        self.shared.registry.reset();
        self.shared.metro.reset(self.shared.config.default_bpm);
        self.sink = None;
        tracing::info!("Sequencer stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.metro.is_running()
    }

    fn halt(&mut self) {
        self.shared.metro.stop();
        self.shared.playback.stop();
        self.shared.controllers.stop();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("Sequencer thread panicked");
            }
        }
    }

    fn spawn_threads(&mut self, sink: &Arc<dyn MidiSink>) -> Result<()> {
        let voices = self.shared.registry.voices();
        let slots = self.shared.registry.len();
        let priority = self.shared.config.realtime_priority;

        // The metronome slot is never queued, its worker drives itself.
        let shared = Arc::clone(&self.shared);
        self.spawn("metrum-playback-producer".to_string(), false, move || {
            producer::run_producer(
                &shared.playback,
                voices,
                shared.config.producer_backoff,
                |slot| PlaybackJob {
                    slot,
                    program: shared.registry.slot(slot).map_or_else(
                        || Arc::new(Program::silence()),
                        Instrument::program,
                    ),
                },
            );
        })?;

        let shared = Arc::clone(&self.shared);
        self.spawn("metrum-controller-producer".to_string(), false, move || {
            producer::run_producer(
                &shared.controllers,
                slots,
                shared.config.producer_backoff,
                |slot| ControllerJob {
                    slot,
                    controllers: shared
                        .registry
                        .slot(slot)
                        .map_or_else(|| Arc::new(Vec::new()), Instrument::controllers),
                },
            );
        })?;

        for slot in 0..voices {
            let shared = Arc::clone(&self.shared);
            let playback_sink = Arc::clone(sink);
            self.spawn(format!("metrum-playback-{slot}"), priority, move || {
                playback::run_playback_worker(&shared, slot, playback_sink.as_ref());
            })?;
        }

        let shared = Arc::clone(&self.shared);
        let metronome_sink = Arc::clone(sink);
        self.spawn("metrum-metronome".to_string(), priority, move || {
            playback::run_metronome_worker(&shared, metronome_sink.as_ref());
        })?;

        for slot in 0..slots {
            let shared = Arc::clone(&self.shared);
            let controller_sink = Arc::clone(sink);
            self.spawn(format!("metrum-controller-{slot}"), priority, move || {
                controller::run_controller_worker(&shared, slot, controller_sink.as_ref());
            })?;
        }

        Ok(())
    }

    fn spawn(
        &mut self,
        name: String,
        realtime: bool,
        body: impl FnOnce() + Send + 'static,
    ) -> Result<()> {
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                if realtime {
                    if let Err(e) =
                        thread_priority::set_current_thread_priority(ThreadPriority::Max)
                    {
                        tracing::debug!("Could not raise thread priority: {:?}", e);
                    }
                }
                body();
            })
            .map_err(|source| Error::ThreadSpawn {
                name: name.clone(),
                source,
            })?;
        tracing::debug!("Spawned {}", name);
        self.threads.push(handle);
        Ok(())
    }

    // ==================== Tempo & position ====================

    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        self.shared.metro.set_tempo(bpm)
    }

    pub fn tempo(&self) -> f64 {
        self.shared.metro.tempo()
    }

    pub fn sync(&self, subdivision: u64) -> u64 {
        self.shared.metro.sync(subdivision)
    }

    pub fn playhead(&self) -> u64 {
        self.shared.metro.playhead()
    }

    pub fn bar(&self) -> u64 {
        self.shared.metro.bar()
    }

    pub fn metro(&self) -> &Metro {
        &self.shared.metro
    }

    // ==================== Voices ====================

    /// Look up a user voice by 1-based id.
    pub fn instrument(&self, id: usize) -> Result<&Instrument> {
        self.shared.registry.voice(id)
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.shared.registry
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.shared.config
    }

    /// Assign a playback program. `Ok(false)` if it was rejected.
    pub fn play(&self, id: usize, program: Program) -> Result<bool> {
        Ok(self.instrument(id)?.assign_program(program))
    }

    pub fn ctrl(&self, id: usize, controllers: Vec<Controller>) -> Result<()> {
        self.instrument(id)?.assign_controllers(controllers);
        Ok(())
    }

    pub fn append_ctrl(&self, id: usize, controllers: Vec<Controller>) -> Result<()> {
        self.instrument(id)?.append_controllers(controllers);
        Ok(())
    }

    pub fn noctrl(&self, id: usize) -> Result<()> {
        self.instrument(id)?.clear_controllers();
        Ok(())
    }

    pub fn noctrl_all(&self) {
        self.shared.registry.clear_all_controllers();
    }

    pub fn mute(&self, id: usize) -> Result<()> {
        self.instrument(id)?.mute();
        Ok(())
    }

    pub fn unmute(&self, id: usize) -> Result<()> {
        self.instrument(id)?.unmute();
        Ok(())
    }

    pub fn mute_all(&self) {
        self.shared.registry.mute_all();
    }

    pub fn unmute_all(&self) {
        self.shared.registry.unmute_all();
    }

    pub fn solo(&self, id: usize) -> Result<()> {
        self.shared.registry.solo(id)
    }

    /// Phase of each playback worker, indexed by worker.
    pub fn worker_states(&self) -> Vec<WorkerPhase> {
        self.shared.phases.iter().map(PhaseCell::get).collect()
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.stop();
    }
}
