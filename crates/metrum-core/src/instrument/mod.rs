//! Per-voice state and the fixed-size registry that owns it.

mod registry;

pub use registry::InstrumentRegistry;

use crate::generator::Frame;
use crate::lockfree::AtomicFlag;
use crate::notes::{Controller, Program};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mutable state of one voice slot.
///
/// Every field is an atomic or a swap cell. The worker running a job for this
/// slot writes the counters. Other threads read them and may observe values that
/// are one step stale.
#[derive(Debug)]
pub struct Instrument {
    index: usize,
    step: Arc<AtomicU64>,
    cc_step: AtomicU64,
    muted: AtomicFlag,
    program: ArcSwap<Program>,
    controllers: ArcSwap<Vec<Controller>>,
    /// Set after a clear: the next `assign_controllers` replaces instead of appending.
    replace_controllers_next: AtomicFlag,
    last_frame: Mutex<Frame>,
}

impl Instrument {
    pub(crate) fn new(index: usize, program: Program) -> Self {
        Self {
            index,
            step: Arc::new(AtomicU64::new(0)),
            cc_step: AtomicU64::new(0),
            muted: AtomicFlag::new(false),
            program: ArcSwap::from_pointee(program),
            controllers: ArcSwap::from_pointee(Vec::new()),
            replace_controllers_next: AtomicFlag::new(true),
            last_frame: Mutex::new(Frame::default()),
        }
    }

    /// Slot index in the registry (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// MIDI channel this slot plays on.
    pub fn channel(&self) -> u8 {
        self.index.min(15) as u8
    }

    // ==================== Counters ====================

    pub fn step(&self) -> u64 {
        self.step.load(Ordering::Acquire)
    }

    pub(crate) fn advance_step(&self) -> u64 {
        self.step.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn step_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.step)
    }

    pub fn cc_step(&self) -> u64 {
        self.cc_step.load(Ordering::Acquire)
    }

    pub(crate) fn advance_cc_step(&self) -> u64 {
        self.cc_step.fetch_add(1, Ordering::AcqRel) + 1
    }

    // ==================== Mute ====================

    pub fn mute(&self) {
        self.muted.set(true);
    }

    pub fn unmute(&self) {
        self.muted.set(false);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.get()
    }

    // ==================== Program ====================

    /// Current program snapshot.
    pub fn program(&self) -> Arc<Program> {
        self.program.load_full()
    }

    /// Replace the playback program.
    ///
    /// The program is rendered once. If it yields no durations the call is
    /// ignored, the previous program stays active and `false` is returned.
    pub fn assign_program(&self, program: Program) -> bool {
        if program.render().durations.is_empty() {
            tracing::debug!(
                "Instrument {}: ignoring program with empty duration pattern",
                self.index
            );
            return false;
        }
        self.program.store(Arc::new(program));
        true
    }

    // ==================== Controllers ====================

    /// Current controller list snapshot.
    pub fn controllers(&self) -> Arc<Vec<Controller>> {
        self.controllers.load_full()
    }

    /// Replace the list after a clear, append to it otherwise.
    pub fn assign_controllers(&self, controllers: Vec<Controller>) {
        if self.replace_controllers_next.swap(false) {
            self.controllers.store(Arc::new(controllers));
        } else {
            self.append_controllers(controllers);
        }
    }

    /// Replace the whole list in one swap.
    pub fn replace_controllers(&self, controllers: Vec<Controller>) {
        self.replace_controllers_next.set(false);
        self.controllers.store(Arc::new(controllers));
    }

    pub fn append_controllers(&self, controllers: Vec<Controller>) {
        self.replace_controllers_next.set(false);
        self.controllers.rcu(|current| {
            let mut next = Vec::clone(current);
            next.extend(controllers.iter().cloned());
            next
        });
    }

    pub fn clear_controllers(&self) {
        self.controllers.store(Arc::new(Vec::new()));
        self.replace_controllers_next.set(true);
    }

    // ==================== Inspection ====================

    /// Last frame rendered by a playback worker.
    pub fn last_frame(&self) -> Frame {
        self.last_frame.lock().clone()
    }

    pub(crate) fn set_last_frame(&self, frame: &Frame) {
        self.last_frame.lock().clone_from(frame);
    }

    /// Back to silence: program, controllers, counters and mute flag.
    pub(crate) fn reset(&self, program: Program) {
        self.program.store(Arc::new(program));
        self.clear_controllers();
        self.step.store(0, Ordering::Release);
        self.cc_step.store(0, Ordering::Release);
        self.muted.set(false);
        *self.last_frame.lock() = Frame::default();
    }
}
