//! Sequencer configuration.

use crate::{Error, Result};
use std::time::Duration;

/// Ticks the metronome produces per bar.
pub const TICKS_PER_BAR: u64 = 64;

/// Lowest accepted tempo.
pub const MIN_BPM: f64 = 20.0;

/// Highest accepted tempo.
pub const MAX_BPM: f64 = 999.0;

/// Pitch value meaning "no sound". Sent as note-on with velocity 0.
pub const REST_NOTE: u8 = 127;

/// Highest number of user voices (one MIDI channel is kept for the metronome slot).
pub const MAX_VOICES: usize = 15;

/// Configuration for the scheduling core.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Number of user voices (default: 5). The registry adds one metronome slot on top.
    pub voices: usize,
    /// Capacity of each job queue (default: 64)
    pub queue_capacity: usize,
    /// Controller refresh rate in Hz (default: 10)
    pub controller_rate_hz: u32,
    /// Producer backoff and idle poll interval (default: 5ms)
    pub producer_backoff: Duration,
    /// Tempo applied on every start (default: 60 BPM)
    pub default_bpm: f64,
    /// Pitch treated as a rest (default: 127)
    pub rest_note: u8,
    /// Request max OS priority for worker threads (default: true)
    pub realtime_priority: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            voices: 5,
            queue_capacity: 64,
            controller_rate_hz: 10,
            producer_backoff: Duration::from_millis(5),
            default_bpm: 60.0,
            rest_note: REST_NOTE,
            realtime_priority: true,
        }
    }
}

impl SequencerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.voices == 0 || self.voices > MAX_VOICES {
            return Err(Error::InvalidConfig(format!(
                "voices {} out of range (1-{})",
                self.voices, MAX_VOICES
            )));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.controller_rate_hz == 0 || self.controller_rate_hz > 1000 {
            return Err(Error::InvalidConfig(format!(
                "controller_rate_hz {} out of range (1-1000 Hz)",
                self.controller_rate_hz
            )));
        }
        if self.producer_backoff.is_zero() {
            return Err(Error::InvalidConfig(
                "producer_backoff must be non-zero".to_string(),
            ));
        }
        if !(MIN_BPM..=MAX_BPM).contains(&self.default_bpm) {
            return Err(Error::InvalidTempo(self.default_bpm));
        }
        if self.rest_note > 127 {
            return Err(Error::InvalidConfig(format!(
                "rest_note {} is not a MIDI data byte",
                self.rest_note
            )));
        }
        Ok(())
    }

    /// Total registry slots: user voices plus the metronome.
    pub fn slots(&self) -> usize {
        self.voices + 1
    }

    /// Period between controller updates.
    pub fn controller_period(&self) -> Duration {
        Duration::from_millis(1000 / self.controller_rate_hz.max(1) as u64)
    }
}
