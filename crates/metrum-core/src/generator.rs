//! Rendering seam between programs and the scheduler.
//!
//! Workers never interpret [`Notes`] directly. They go through a [`Generator`],
//! which turns program output into MIDI-ready frames. [`MidiGenerator`] is the
//! stock implementation. Pattern layers can plug in their own.

use crate::config::REST_NOTE;
use crate::notes::{Cc, Controller, Notes, Program};

/// A rendered playback frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// MIDI pitches, rest value included.
    pub pitches: Vec<u8>,
    pub velocity: u8,
    /// Step durations in microseconds. Empty for voicing-only renders.
    pub durations_us: Vec<f64>,
}

pub trait Generator: Send + Sync {
    /// Render pitches, velocity and durations for a bar of `bar_us` microseconds.
    fn render(&self, program: &Program, bar_us: f64) -> Frame;

    /// Render pitches and velocity only. Durations stay committed from the first render.
    fn render_voicing(&self, program: &Program) -> Frame;

    fn render_controllers(&self, controllers: &[Controller]) -> Vec<Cc>;
}

/// Default generator: octave transposition, velocity clamping, bar-relative durations.
#[derive(Debug, Clone, Copy)]
pub struct MidiGenerator {
    rest_note: u8,
}

impl MidiGenerator {
    pub fn new(rest_note: u8) -> Self {
        Self { rest_note }
    }

    fn voicing(&self, notes: &Notes) -> Frame {
        let shift = 12i32.saturating_mul(notes.octave.saturating_sub(1));
        let pitches = notes
            .pitches
            .iter()
            .map(|&pitch| {
                if pitch == self.rest_note as i32 {
                    self.rest_note
                } else {
                    self.sounding_pitch(pitch.saturating_add(shift))
                }
            })
            .collect();

        Frame {
            pitches,
            velocity: notes.amp.round().clamp(0.0, 127.0) as u8,
            durations_us: Vec::new(),
        }
    }

    /// Clamp to the MIDI range, stepping off the rest value so the note stays audible.
    fn sounding_pitch(&self, pitch: i32) -> u8 {
        match pitch.clamp(0, 127) as u8 {
            p if p != self.rest_note => p,
            127 => 126,
            p => p + 1,
        }
    }
}

impl Default for MidiGenerator {
    fn default() -> Self {
        Self::new(REST_NOTE)
    }
}

impl Generator for MidiGenerator {
    fn render(&self, program: &Program, bar_us: f64) -> Frame {
        let notes = program.render();
        let mut frame = self.voicing(&notes);
        frame.durations_us = notes
            .durations
            .iter()
            .map(|&d| bar_us / d.max(1) as f64)
            .collect();
        frame
    }

    fn render_voicing(&self, program: &Program) -> Frame {
        self.voicing(&program.render())
    }

    fn render_controllers(&self, controllers: &[Controller]) -> Vec<Cc> {
        controllers.iter().map(Controller::render).collect()
    }
}
