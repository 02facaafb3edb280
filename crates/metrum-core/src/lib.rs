//! Scheduling core for the metrum MIDI sequencer.
//!
//! # Primary API
//!
//! - [`Sequencer`]: Thread lifecycle and control surface (start/stop, tempo, mute/solo)
//! - [`Metro`]: Tempo, tick counter and drift compensation table
//! - [`Program`] / [`Controller`]: User callables rendered on every step
//! - [`MidiSink`]: Output seam, [`CaptureSink`] for in-memory capture
//! - [`Generator`]: Turns program output into MIDI-ready frames
//!
//! # Example
//!
//! ```ignore
//! use metrum_core::*;
//! use std::sync::Arc;
//!
//! let (sink, consumer) = capture_sink();
//! let mut seq = Sequencer::new(SequencerConfig::default())?;
//! seq.start(Arc::new(sink))?;
//! seq.play(1, Program::constant(Notes::new(vec![60, 64, 67], 100.0, vec![4, 4, 2])))?;
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{SequencerConfig, MAX_BPM, MAX_VOICES, MIN_BPM, REST_NOTE, TICKS_PER_BAR};

pub(crate) mod lockfree;
pub use lockfree::{AtomicDouble, AtomicFlag};

mod notes;
pub use notes::{Cc, Controller, Notes, Program};

mod generator;
pub use generator::{Frame, Generator, MidiGenerator};

pub mod sink;
pub use sink::{capture_sink, CaptureConsumer, CaptureSink, MidiSink, ShortMessage, TimedMessage};

pub mod queue;
pub use queue::{ControllerJob, JobQueue, PlaybackJob, RunGate};

pub mod clock;
pub use clock::{bar_duration_us, corrected_sleep_us, sync_ticks, Metro};

mod instrument;
pub use instrument::{Instrument, InstrumentRegistry};

mod scheduler;
pub use scheduler::{Sequencer, WorkerPhase};
