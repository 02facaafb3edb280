//! Bounded job queues gated by a running flag.
//!
//! Producers push with `push()` and back off when it hands the job back.
//! Workers take their own slot's jobs with `pop_where()` and pace themselves
//! with [`RunGate::sleep`], which returns early once the queue is stopped.

use crate::lockfree::AtomicFlag;
use crate::notes::{Controller, Program};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Running flag with an interruptible sleep.
#[derive(Debug, Default)]
pub struct RunGate {
    running: AtomicFlag,
    lock: Mutex<()>,
    wake: Condvar,
}

impl RunGate {
    pub fn new(running: bool) -> Self {
        Self {
            running: AtomicFlag::new(running),
            lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn open(&self) {
        self.running.set(true);
    }

    /// Clears the flag and wakes every sleeper.
    pub fn close(&self) {
        self.running.set(false);
        let _guard = self.lock.lock();
        self.wake.notify_all();
    }

    /// Sleep for `duration` unless the gate closes first.
    ///
    /// Returns `true` if the gate is still open when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.lock.lock();
        loop {
            if !self.running.get() {
                return false;
            }
            if Instant::now() >= deadline {
                return true;
            }
            self.wake.wait_until(&mut guard, deadline);
        }
    }
}

/// Bounded FIFO of pending jobs for one job kind.
pub struct JobQueue<J> {
    jobs: Mutex<VecDeque<J>>,
    capacity: usize,
    gate: RunGate,
}

impl<J> JobQueue<J> {
    /// Create a stopped queue.
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            gate: RunGate::new(false),
        }
    }

    /// Enqueue a job.
    ///
    /// Hands the job back when the queue is full or stopped. That is backpressure,
    /// the caller retries later.
    pub fn push(&self, job: J) -> Result<(), J> {
        if !self.gate.is_running() {
            return Err(job);
        }
        let mut jobs = self.jobs.lock();
        if jobs.len() >= self.capacity {
            return Err(job);
        }
        jobs.push_back(job);
        Ok(())
    }

    /// Remove the oldest job.
    pub fn pop(&self) -> Option<J> {
        self.jobs.lock().pop_front()
    }

    /// Remove the oldest job matching `pred`, leaving the others in order.
    pub fn pop_where(&self, pred: impl FnMut(&J) -> bool) -> Option<J> {
        let mut jobs = self.jobs.lock();
        let index = jobs.iter().position(pred)?;
        jobs.remove(index)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn has_capacity(&self) -> bool {
        self.len() < self.capacity
    }

    /// Drop leftover jobs and re-arm the running flag.
    pub fn start(&self) {
        self.jobs.lock().clear();
        self.gate.open();
    }

    /// Clear the running flag. Queued jobs are not drained.
    pub fn stop(&self) {
        self.gate.close();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }

    pub fn gate(&self) -> &RunGate {
        &self.gate
    }
}

/// Render one playback program for a slot.
#[derive(Debug, Clone)]
pub struct PlaybackJob {
    pub slot: usize,
    /// Program snapshot taken at enqueue time.
    pub program: Arc<Program>,
}

/// Render one round of controller values for a slot.
#[derive(Debug, Clone)]
pub struct ControllerJob {
    pub slot: usize,
    /// Controller list snapshot taken at enqueue time.
    pub controllers: Arc<Vec<Controller>>,
}
