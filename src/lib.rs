//! # Metrum - Live-coding MIDI Sequencer
//!
//! Multi-voice sequencer that renders user programs into timed MIDI notes and
//! controller changes, with per-voice drift compensation.
//!
//! ## Architecture
//!
//! Metrum is an umbrella crate that coordinates:
//! - **metrum-core** - Job queues, playback/controller workers, clock, instrument registry
//! - **metrum-midi-io** - Hardware MIDI output (midir)
//!
//! ## Quick Start
//!
//! ```ignore
//! use metrum::prelude::*;
//!
//! let mut engine = Metrum::builder()
//!     .voices(3)
//!     .bpm(110.0)
//!     .build()?;
//!
//! engine.start()?;
//!
//! // Voice 1: C major arpeggio in quarter notes
//! engine.play(1, Program::constant(Notes::new(vec![60, 64, 67], 100.0, vec![4, 4, 4, 4])))?;
//!
//! // Sweep a filter on voice 1
//! engine.ctrl(1, vec![Controller::constant(74, 90)])?;
//!
//! engine.stop();
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Hardware MIDI output
//! - `midi-hardware` - midir-backed output ports

/// Re-export of metrum-core for direct access
pub use metrum_core as core;

pub use metrum_core::{
    // Values
    Cc,
    Controller,
    Frame,
    Notes,
    Program,

    // Sequencer
    Generator,
    Instrument,
    Metro,
    MidiGenerator,
    Sequencer,
    SequencerConfig,
    WorkerPhase,

    // Output
    capture_sink,
    CaptureConsumer,
    CaptureSink,
    MidiSink,
    ShortMessage,
    TimedMessage,

    // Constants
    MAX_BPM,
    MAX_VOICES,
    MIN_BPM,
    REST_NOTE,
    TICKS_PER_BAR,
};

// Hardware MIDI output
#[cfg(feature = "midi-hardware")]
pub use metrum_midi_io as midi;

#[cfg(feature = "midi-hardware")]
pub use metrum_midi_io::{MidiOutputDevice, MidiOutputPort};

mod builder;
mod engine;
mod error;

pub use builder::MetrumBuilder;
pub use engine::Metrum;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{Metrum, MetrumBuilder};

    // Programs
    pub use crate::core::{Cc, Controller, Notes, Program};

    // Output
    pub use crate::core::{capture_sink, MidiSink};

    #[cfg(feature = "midi-hardware")]
    pub use crate::midi::{MidiOutputDevice, MidiOutputPort};
}
