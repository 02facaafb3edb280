//! MIDI output: device enumeration and a connected port usable as a sink.

use crate::error::{Error, Result};
use metrum_core::{MidiSink, ShortMessage};
use midir::{MidiOutput, MidiOutputConnection};
use parking_lot::Mutex;
use tracing::{debug, info};

const CLIENT_NAME: &str = "metrum-midi-output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

/// Enumerate system MIDI output ports. Empty if the backend is unavailable.
pub fn list_devices() -> Vec<MidiOutputDevice> {
    let mut devices = Vec::new();
    if let Ok(midi_output) = MidiOutput::new("metrum-device-list") {
        for (index, port) in midi_output.ports().iter().enumerate() {
            let name = midi_output
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            devices.push(MidiOutputDevice { index, name });
        }
    }
    devices
}

/// First device whose name contains `name`, ignoring case.
pub fn find_device<'a>(
    devices: &'a [MidiOutputDevice],
    name: &str,
) -> Option<&'a MidiOutputDevice> {
    let needle = name.to_lowercase();
    devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&needle))
}

/// An open hardware output port.
///
/// Sends from concurrent workers are serialized behind a mutex, one short
/// message per lock.
pub struct MidiOutputPort {
    connection: Mutex<MidiOutputConnection>,
    name: String,
}

impl MidiOutputPort {
    /// Open the output port at `index` (see [`list_devices`]).
    pub fn open(index: usize) -> Result<Self> {
        let midi_output = MidiOutput::new(CLIENT_NAME)?;

        let ports = midi_output.ports();
        let port = ports
            .get(index)
            .ok_or_else(|| Error::MidiDevice(format!("MIDI output device {} not found", index)))?;

        let name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", index));

        let connection = midi_output.connect(port, "metrum-output")?;
        info!("Opened MIDI output '{}'", name);

        Ok(Self {
            connection: Mutex::new(connection),
            name,
        })
    }

    /// Open the first port whose name contains `name` (case-insensitive).
    pub fn open_by_name(name: &str) -> Result<Self> {
        let devices = list_devices();
        let device = find_device(&devices, name).ok_or_else(|| {
            Error::MidiDevice(format!("No MIDI output device found matching '{}'", name))
        })?;
        Self::open(device.index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.connection.lock().send(bytes)?;
        Ok(())
    }
}

impl MidiSink for MidiOutputPort {
    fn send(&self, message: ShortMessage) -> metrum_core::Result<()> {
        self.send_bytes(message.as_bytes())?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for MidiOutputPort {
    fn drop(&mut self) {
        debug!("Closing MIDI output '{}'", self.name);
    }
}
