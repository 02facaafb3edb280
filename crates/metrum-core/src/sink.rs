//! MIDI output seam: 3-byte channel messages and the sinks that accept them.

use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Instant;

/// A 3-byte MIDI channel voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortMessage {
    bytes: [u8; 3],
}

impl ShortMessage {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::channel_message(Self::NOTE_ON, channel, note, velocity)
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self::channel_message(Self::NOTE_OFF, channel, note, 0)
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::channel_message(Self::CONTROL_CHANGE, channel, controller, value)
    }

    fn channel_message(kind: u8, channel: u8, data1: u8, data2: u8) -> Self {
        let channel = channel.min(15); // MIDI channels are 0-15
        Self {
            bytes: [kind | channel, data1 & 0x7F, data2 & 0x7F],
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.bytes
    }

    #[inline]
    pub fn kind(&self) -> u8 {
        self.bytes[0] & 0xF0
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0x0F
    }

    #[inline]
    pub fn data1(&self) -> u8 {
        self.bytes[1]
    }

    #[inline]
    pub fn data2(&self) -> u8 {
        self.bytes[2]
    }

    pub fn is_note_on(&self) -> bool {
        self.kind() == Self::NOTE_ON
    }

    pub fn is_note_off(&self) -> bool {
        self.kind() == Self::NOTE_OFF
    }

    pub fn is_control_change(&self) -> bool {
        self.kind() == Self::CONTROL_CHANGE
    }
}

/// Destination for scheduled messages.
///
/// Shared by every worker thread, so implementations must tolerate concurrent
/// `send` calls (serialize internally if the transport cannot).
pub trait MidiSink: Send + Sync {
    fn send(&self, message: ShortMessage) -> Result<()>;

    fn name(&self) -> &str {
        "midi-sink"
    }
}

/// A message with the instant it reached the sink.
#[derive(Debug, Clone, Copy)]
pub struct TimedMessage {
    pub at: Instant,
    pub message: ShortMessage,
}

/// In-memory sink recording every message with its send time.
#[derive(Clone)]
pub struct CaptureSink {
    tx: Sender<TimedMessage>,
}

/// Receiving side of a [`CaptureSink`].
pub struct CaptureConsumer {
    rx: Receiver<TimedMessage>,
}

/// Create a connected capture sink/consumer pair.
pub fn capture_sink() -> (CaptureSink, CaptureConsumer) {
    let (tx, rx) = unbounded();
    (CaptureSink { tx }, CaptureConsumer { rx })
}

impl MidiSink for CaptureSink {
    fn send(&self, message: ShortMessage) -> Result<()> {
        self.tx
            .send(TimedMessage {
                at: Instant::now(),
                message,
            })
            .map_err(|_| crate::Error::Sink("capture consumer dropped".to_string()))
    }

    fn name(&self) -> &str {
        "capture"
    }
}

impl CaptureConsumer {
    pub fn drain(&self) -> Vec<TimedMessage> {
        self.rx.try_iter().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.rx.len()
    }
}
