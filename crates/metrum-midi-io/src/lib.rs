//! Hardware MIDI output for metrum.
//!
//! [`MidiOutputPort`] opens a system output port through midir and implements
//! [`metrum_core::MidiSink`], so it can be handed straight to a sequencer.

pub mod error;
pub use error::{Error, Result};

mod output;
pub use output::{find_device, list_devices, MidiOutputDevice, MidiOutputPort};
