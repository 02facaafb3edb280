//! Error types for hardware MIDI output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI send error: {0}")]
    MidiSend(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(e: midir::SendError) -> Self {
        Error::MidiSend(e.to_string())
    }
}

impl From<Error> for metrum_core::Error {
    fn from(e: Error) -> Self {
        metrum_core::Error::Sink(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
