//! Metrum engine: a sequencer bound to a MIDI output.

use crate::core::{
    Controller, Instrument, MidiSink, Program, Sequencer, SequencerConfig, WorkerPhase,
};
use crate::Result;
use std::sync::Arc;

#[cfg(feature = "midi-hardware")]
use crate::midi::{MidiOutputDevice, MidiOutputPort};

/// Where `start()` sends MIDI.
pub(crate) enum Output {
    FirstPort,
    #[cfg(feature = "midi-hardware")]
    Port(usize),
    #[cfg(feature = "midi-hardware")]
    PortName(String),
    Sink(Arc<dyn MidiSink>),
}

/// Main entry point.
///
/// Wraps a [`Sequencer`] and resolves its output on every start. Voices are
/// addressed by 1-based id.
///
/// # Example
///
/// ```ignore
/// use metrum::prelude::*;
///
/// let mut engine = Metrum::builder().voices(2).build()?;
/// engine.start()?;
///
/// engine.play(1, Program::constant(Notes::new(vec![60, 64, 67], 90.0, vec![4, 4, 2])))?;
/// engine.ctrl(1, vec![Controller::constant(74, 64)])?;
/// engine.set_tempo(120.0)?;
/// ```
pub struct Metrum {
    sequencer: Sequencer,
    output: Output,
}

impl Metrum {
    pub fn builder() -> crate::MetrumBuilder {
        crate::MetrumBuilder::default()
    }

    pub(crate) fn from_parts(sequencer: Sequencer, output: Output) -> Self {
        Self { sequencer, output }
    }

    // ==================== Lifecycle ====================

    /// Open the output and start playing.
    ///
    /// Failure to open the output is returned and nothing is started. Calling
    /// start while running logs a warning and does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.sequencer.is_running() {
            tracing::warn!("Metrum already running, ignoring start");
            return Ok(());
        }
        let sink = self.open_output()?;
        tracing::info!("Starting on MIDI output '{}'", sink.name());
        self.sequencer.start(sink)?;
        Ok(())
    }

    /// Stop playing. Sounding notes are released first.
    pub fn stop(&mut self) {
        self.sequencer.stop();
    }

    pub fn is_running(&self) -> bool {
        self.sequencer.is_running()
    }

    fn open_output(&self) -> Result<Arc<dyn MidiSink>> {
        match &self.output {
            Output::Sink(sink) => Ok(Arc::clone(sink)),
            #[cfg(feature = "midi-hardware")]
            Output::FirstPort => Ok(Arc::new(MidiOutputPort::open(0)?)),
            #[cfg(not(feature = "midi-hardware"))]
            Output::FirstPort => Err(crate::Error::NoOutput),
            #[cfg(feature = "midi-hardware")]
            Output::Port(index) => Ok(Arc::new(MidiOutputPort::open(*index)?)),
            #[cfg(feature = "midi-hardware")]
            Output::PortName(name) => Ok(Arc::new(MidiOutputPort::open_by_name(name)?)),
        }
    }

    /// List system MIDI output ports.
    #[cfg(feature = "midi-hardware")]
    pub fn list_output_devices() -> Vec<MidiOutputDevice> {
        crate::midi::list_devices()
    }

    // ==================== Tempo & position ====================

    /// Applies at each voice's next bar.
    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        Ok(self.sequencer.set_tempo(bpm)?)
    }

    pub fn tempo(&self) -> f64 {
        self.sequencer.tempo()
    }

    pub fn sync(&self, subdivision: u64) -> u64 {
        self.sequencer.sync(subdivision)
    }

    pub fn playhead(&self) -> u64 {
        self.sequencer.playhead()
    }

    pub fn bar(&self) -> u64 {
        self.sequencer.bar()
    }

    // ==================== Voices ====================

    /// Returns `Ok(false)` if the program was rejected.
    pub fn play(&self, id: usize, program: Program) -> Result<bool> {
        Ok(self.sequencer.play(id, program)?)
    }

    pub fn ctrl(&self, id: usize, controllers: Vec<Controller>) -> Result<()> {
        Ok(self.sequencer.ctrl(id, controllers)?)
    }

    pub fn append_ctrl(&self, id: usize, controllers: Vec<Controller>) -> Result<()> {
        Ok(self.sequencer.append_ctrl(id, controllers)?)
    }

    pub fn noctrl(&self, id: usize) -> Result<()> {
        Ok(self.sequencer.noctrl(id)?)
    }

    pub fn noctrl_all(&self) {
        self.sequencer.noctrl_all();
    }

    pub fn mute(&self, id: usize) -> Result<()> {
        Ok(self.sequencer.mute(id)?)
    }

    pub fn unmute(&self, id: usize) -> Result<()> {
        Ok(self.sequencer.unmute(id)?)
    }

    pub fn mute_all(&self) {
        self.sequencer.mute_all();
    }

    pub fn unmute_all(&self) {
        self.sequencer.unmute_all();
    }

    pub fn solo(&self, id: usize) -> Result<()> {
        Ok(self.sequencer.solo(id)?)
    }

    pub fn instrument(&self, id: usize) -> Result<&Instrument> {
        Ok(self.sequencer.instrument(id)?)
    }

    // ==================== Inspection ====================

    pub fn worker_states(&self) -> Vec<WorkerPhase> {
        self.sequencer.worker_states()
    }

    pub fn config(&self) -> &SequencerConfig {
        self.sequencer.config()
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }
}

impl std::fmt::Debug for Metrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrum")
            .field("voices", &self.config().voices)
            .field("running", &self.is_running())
            .field("tempo", &self.tempo())
            .finish()
    }
}
