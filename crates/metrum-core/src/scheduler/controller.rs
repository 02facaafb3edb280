//! Fixed-rate controller worker.

use super::playback::send;
use super::Shared;
use crate::sink::{MidiSink, ShortMessage};
use std::time::Instant;

/// Emit the controller jobs queued for `slot` at the configured rate.
pub(crate) fn run_controller_worker(shared: &Shared, slot: usize, sink: &dyn MidiSink) {
    let queue = &shared.controllers;
    let period = shared.config.controller_period();
    tracing::debug!("Controller worker {} started", slot);

    while queue.is_running() {
        let start = Instant::now();

        if let Some(job) = queue.pop_where(|job| job.slot == slot) {
            if let Some(inst) = shared.registry.slot(job.slot) {
                for cc in shared.generator.render_controllers(&job.controllers) {
                    send(
                        sink,
                        ShortMessage::control_change(inst.channel(), cc.controller, cc.value),
                    );
                }
                inst.advance_cc_step();
            }
        }

        if !queue.gate().sleep(period.saturating_sub(start.elapsed())) {
            break;
        }
    }

    tracing::debug!("Controller worker {} exited", slot);
}
