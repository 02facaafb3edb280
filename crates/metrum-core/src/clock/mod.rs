//! Tempo, tick counting and per-slot drift bookkeeping.

mod compensation;

pub use compensation::{bar_debt_us, corrected_sleep_us, sleep_overrun_us};

use crate::config::{MAX_BPM, MIN_BPM, TICKS_PER_BAR};
use crate::lockfree::{AtomicDouble, AtomicFlag};
use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Microseconds per minute.
const US_PER_MINUTE: f64 = 60_000_000.0;

/// Beats per bar.
const BEATS_PER_BAR: f64 = 4.0;

/// Shared clock.
///
/// Tempo is read by every playback worker at the start of each bar. The tick
/// counter is the metronome slot's step counter, so ticks advance only while the
/// sequencer is playing.
#[derive(Debug)]
pub struct Metro {
    tempo: AtomicDouble,
    running: AtomicFlag,
    ticks: Arc<AtomicU64>,
    /// Debt per slot in microseconds.
    waiting_times: Vec<AtomicDouble>,
}

impl Metro {
    pub fn new(slots: usize, bpm: f64, ticks: Arc<AtomicU64>) -> Self {
        Self {
            tempo: AtomicDouble::new(bpm.clamp(MIN_BPM, MAX_BPM)),
            running: AtomicFlag::new(false),
            ticks,
            waiting_times: (0..slots).map(|_| AtomicDouble::new(0.0)).collect(),
        }
    }

    // ==================== Tempo ====================

    pub fn tempo(&self) -> f64 {
        self.tempo.get()
    }

    /// Set the tempo. Takes effect at each worker's next bar boundary.
    pub fn set_tempo(&self, bpm: f64) -> Result<()> {
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            tracing::warn!("Rejected tempo {} BPM", bpm);
            return Err(Error::InvalidTempo(bpm));
        }
        self.tempo.set(bpm);
        tracing::debug!("Tempo set to {} BPM", bpm);
        Ok(())
    }

    /// Length of one bar at the current tempo.
    pub fn bar_duration_us(&self) -> f64 {
        bar_duration_us(self.tempo())
    }

    // ==================== Position ====================

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Tick count mapped onto `subdivision` steps per bar.
    ///
    /// Floors, so with coarse subdivisions several ticks map to the same step.
    pub fn sync(&self, subdivision: u64) -> u64 {
        sync_ticks(self.ticks(), subdivision)
    }

    /// Position in quarter notes.
    pub fn playhead(&self) -> u64 {
        self.sync(4)
    }

    /// Raw tick count.
    pub fn bar(&self) -> u64 {
        self.sync(TICKS_PER_BAR)
    }

    pub fn tick_in_bar(&self) -> u64 {
        self.ticks() % TICKS_PER_BAR
    }

    // ==================== Compensation ====================

    /// Debt carried by `slot` into its next bar.
    pub fn waiting_time(&self, slot: usize) -> f64 {
        self.waiting_times.get(slot).map_or(0.0, AtomicDouble::get)
    }

    /// Record how long a bar took on `slot`. Returns the new debt.
    pub fn record_bar(&self, slot: usize, elapsed_us: f64, bar_us: f64) -> f64 {
        let debt = bar_debt_us(elapsed_us, bar_us);
        if let Some(cell) = self.waiting_times.get(slot) {
            cell.set(debt);
        }
        if debt > 0.0 {
            tracing::trace!("Slot {} finished bar {:.0}us late", slot, debt);
        }
        debt
    }

    // ==================== Lifecycle ====================

    pub fn start(&self) {
        self.running.set(true);
    }

    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Restore `bpm` and clear the compensation table.
    pub fn reset(&self, bpm: f64) {
        self.tempo.set(bpm.clamp(MIN_BPM, MAX_BPM));
        for cell in &self.waiting_times {
            cell.set(0.0);
        }
    }
}

/// Bar length in microseconds for a tempo in BPM (4 beats per bar).
#[inline]
pub fn bar_duration_us(bpm: f64) -> f64 {
    US_PER_MINUTE / bpm * BEATS_PER_BAR
}

#[inline]
pub fn sync_ticks(ticks: u64, subdivision: u64) -> u64 {
    ticks.saturating_mul(subdivision) / TICKS_PER_BAR
}
