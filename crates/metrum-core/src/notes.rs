//! Playback programs, controller callables and the values they produce.

use std::fmt;
use std::sync::Arc;

/// One frame produced by a playback program.
#[derive(Debug, Clone, PartialEq)]
pub struct Notes {
    /// Pitches sounded together on every step.
    pub pitches: Vec<i32>,
    /// Amplitude for the whole frame, used as note-on velocity.
    pub amp: f64,
    /// One entry per step. `d` lasts 1/d of a bar.
    pub durations: Vec<u32>,
    /// Octave offset, `1` leaves pitches untouched.
    pub octave: i32,
}

impl Notes {
    pub fn new(pitches: Vec<i32>, amp: f64, durations: Vec<u32>) -> Self {
        Self {
            pitches,
            amp,
            durations,
            octave: 1,
        }
    }

    pub fn with_octave(mut self, octave: i32) -> Self {
        self.octave = octave;
        self
    }

    /// A whole bar of silence.
    pub fn silence() -> Self {
        Self::new(Vec::new(), 0.0, vec![1])
    }
}

/// Controller change value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cc {
    pub controller: u8,
    pub value: u8,
}

impl Cc {
    /// Values outside the MIDI data byte range are clamped.
    pub fn new(controller: i32, value: i32) -> Self {
        Self {
            controller: controller.clamp(0, 127) as u8,
            value: value.clamp(0, 127) as u8,
        }
    }
}

/// User-supplied callable producing a [`Notes`] frame.
pub struct Program {
    render: Box<dyn Fn() -> Notes + Send + Sync>,
}

impl Program {
    pub fn new(render: impl Fn() -> Notes + Send + Sync + 'static) -> Self {
        Self {
            render: Box::new(render),
        }
    }

    /// Program that always renders the same frame.
    pub fn constant(notes: Notes) -> Self {
        Self::new(move || notes.clone())
    }

    pub fn silence() -> Self {
        Self::constant(Notes::silence())
    }

    #[inline]
    pub fn render(&self) -> Notes {
        (self.render)()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").finish_non_exhaustive()
    }
}

/// User-supplied callable producing a controller value.
#[derive(Clone)]
pub struct Controller {
    render: Arc<dyn Fn() -> Cc + Send + Sync>,
}

impl Controller {
    pub fn new(render: impl Fn() -> Cc + Send + Sync + 'static) -> Self {
        Self {
            render: Arc::new(render),
        }
    }

    pub fn constant(controller: i32, value: i32) -> Self {
        let cc = Cc::new(controller, value);
        Self::new(move || cc)
    }

    #[inline]
    pub fn render(&self) -> Cc {
        (self.render)()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller").finish_non_exhaustive()
    }
}
