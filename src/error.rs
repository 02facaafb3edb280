//! Centralized error type for the metrum umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] metrum_core::Error),

    #[cfg(feature = "midi-hardware")]
    #[error("MIDI: {0}")]
    Midi(#[from] metrum_midi_io::Error),

    #[error("No MIDI output configured")]
    NoOutput,
}

pub type Result<T> = std::result::Result<T, Error>;
