//! Round-robin job producers.

use crate::queue::JobQueue;
use std::time::Duration;

/// Cycles slot ids `0..len` in order.
#[derive(Debug, Clone)]
pub(crate) struct RoundRobin {
    next: usize,
    len: usize,
}

impl RoundRobin {
    pub(crate) fn new(len: usize) -> Self {
        Self { next: 0, len }
    }

    #[inline]
    pub(crate) fn current(&self) -> usize {
        self.next
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.next = (self.next + 1) % self.len.max(1);
    }
}

/// Keep `queue` topped up until it stops.
///
/// The id only advances on a successful push, so `k * slots` pushes contain
/// every slot exactly `k` times.
pub(crate) fn run_producer<J>(
    queue: &JobQueue<J>,
    slots: usize,
    backoff: Duration,
    mut make_job: impl FnMut(usize) -> J,
) {
    let mut ids = RoundRobin::new(slots);

    while queue.is_running() {
        if queue.has_capacity() && queue.push(make_job(ids.current())).is_ok() {
            ids.advance();
            continue;
        }
        if !queue.gate().sleep(backoff) {
            break;
        }
    }
}
