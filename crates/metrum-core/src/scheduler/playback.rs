//! Note-timing workers.
//!
//! Each voice slot has one worker that plays only its own jobs, so an
//! instrument's note-on/off pairs never interleave. The metronome slot is
//! driven by its own loop and never waits on the queue.

use super::{PhaseCell, Shared, WorkerPhase};
use crate::clock::{corrected_sleep_us, sleep_overrun_us};
use crate::instrument::Instrument;
use crate::queue::PlaybackJob;
use crate::sink::{MidiSink, ShortMessage};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Completed,
    Stopped,
}

/// Play every job queued for `slot`, one bar per job.
pub(crate) fn run_playback_worker(shared: &Shared, slot: usize, sink: &dyn MidiSink) {
    let phase = &shared.phases[slot];
    let queue = &shared.playback;
    tracing::debug!("Playback worker {} started", slot);

    while queue.is_running() {
        let bar_start = Instant::now();
        let bar_us = shared.metro.bar_duration_us();

        phase.set(WorkerPhase::AwaitingJob);
        let Some(job) = queue.pop_where(|job| job.slot == slot) else {
            queue.gate().sleep(shared.config.producer_backoff);
            continue;
        };

        if play_job(shared, &job, bar_us, sink, phase) == JobOutcome::Stopped {
            break;
        }

        phase.set(WorkerPhase::BarBoundary);
        shared.metro.record_bar(slot, elapsed_us(bar_start), bar_us);
    }

    phase.set(WorkerPhase::Stopped);
    tracing::debug!("Playback worker {} exited", slot);
}

/// Drive the clock: play the metronome program over every bar, off the queue.
pub(crate) fn run_metronome_worker(shared: &Shared, sink: &dyn MidiSink) {
    let slot = shared.registry.metronome_slot();
    let phase = &shared.phases[slot];
    let gate = shared.playback.gate();
    tracing::debug!("Metronome worker started on slot {}", slot);

    while gate.is_running() {
        let bar_start = Instant::now();
        let bar_us = shared.metro.bar_duration_us();
        let job = PlaybackJob {
            slot,
            program: shared.registry.metronome().program(),
        };

        if play_metronome_bar(shared, &job, bar_us, sink, phase) == JobOutcome::Stopped {
            break;
        }

        phase.set(WorkerPhase::BarBoundary);
        shared.metro.record_bar(slot, elapsed_us(bar_start), bar_us);
    }

    phase.set(WorkerPhase::Stopped);
    tracing::debug!("Metronome worker exited");
}

/// Play every step of one job's plan.
pub(crate) fn play_job(
    shared: &Shared,
    job: &PlaybackJob,
    bar_us: f64,
    sink: &dyn MidiSink,
    phase: &PhaseCell,
) -> JobOutcome {
    play_plan(shared, job, bar_us, sink, phase, |plan| plan)
}

/// Repeat the job's plan until it covers one bar.
pub(crate) fn play_metronome_bar(
    shared: &Shared,
    job: &PlaybackJob,
    bar_us: f64,
    sink: &dyn MidiSink,
    phase: &PhaseCell,
) -> JobOutcome {
    play_plan(shared, job, bar_us, sink, phase, |plan| fill_bar(plan, bar_us))
}

fn play_plan(
    shared: &Shared,
    job: &PlaybackJob,
    bar_us: f64,
    sink: &dyn MidiSink,
    phase: &PhaseCell,
    shape: impl FnOnce(Vec<f64>) -> Vec<f64>,
) -> JobOutcome {
    let Some(inst) = shared.registry.slot(job.slot) else {
        tracing::warn!("Playback job for unknown slot {}", job.slot);
        return JobOutcome::Completed;
    };
    let gate = shared.playback.gate();
    let debt = shared.metro.waiting_time(job.slot);

    phase.set(WorkerPhase::RenderingStep);
    let mut frame = shared.generator.render(&job.program, bar_us);
    let plan = shape(std::mem::take(&mut frame.durations_us));
    let mut overrun = 0.0;

    for (step, &dur) in plan.iter().enumerate() {
        if step > 0 {
            phase.set(WorkerPhase::RenderingStep);
            frame = shared.generator.render_voicing(&job.program);
        }
        inst.set_last_frame(&frame);

        for &pitch in &frame.pitches {
            let velocity = if pitch == shared.config.rest_note || inst.is_muted() {
                0
            } else {
                frame.velocity
            };
            send(sink, ShortMessage::note_on(inst.channel(), pitch, velocity));
        }
        inst.advance_step();

        let t = corrected_sleep_us(dur, bar_us, debt, overrun);
        phase.set(WorkerPhase::Sleeping);
        let sleep_start = Instant::now();
        let still_running = gate.sleep(Duration::from_micros(t.max(0.0) as u64));

        if !still_running {
            phase.set(WorkerPhase::DrainingOnStop);
            release(sink, inst, &frame.pitches);
            return JobOutcome::Stopped;
        }

        phase.set(WorkerPhase::EmittingOff);
        release(sink, inst, &frame.pitches);
        overrun = sleep_overrun_us(elapsed_us(sleep_start), t);
    }

    JobOutcome::Completed
}

/// Cycle `plan` a whole number of times so it spans about `bar_us`.
fn fill_bar(plan: Vec<f64>, bar_us: f64) -> Vec<f64> {
    let total: f64 = plan.iter().sum();
    if plan.is_empty() || total.is_nan() || total <= 0.0 {
        return plan;
    }
    let cycles = ((bar_us / total).round() as usize).max(1);
    plan.iter().copied().cycle().take(plan.len() * cycles).collect()
}

fn release(sink: &dyn MidiSink, inst: &Instrument, pitches: &[u8]) {
    for &pitch in pitches {
        send(sink, ShortMessage::note_off(inst.channel(), pitch));
    }
}

pub(crate) fn send(sink: &dyn MidiSink, message: ShortMessage) {
    match sink.send(message) {
        Ok(()) => tracing::trace!("{} <- {:02X?}", sink.name(), message.as_bytes()),
        Err(e) => tracing::warn!("Failed to send to {}: {}", sink.name(), e),
    }
}

#[inline]
fn elapsed_us(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1_000_000.0
}
