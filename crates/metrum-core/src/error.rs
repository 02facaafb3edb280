//! Error types for metrum-core.

use thiserror::Error;

/// Error type for metrum-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 20.0 and 999.0 BPM")]
    InvalidTempo(f64),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(usize),

    #[error("MIDI sink error: {0}")]
    Sink(String),

    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
