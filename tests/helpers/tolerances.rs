//! Timing tolerances for scheduling tests.
//!
//! Workers sleep on a condition variable, so wakeups land a little late on a
//! loaded machine. These bounds are loose enough for CI and tight enough to
//! catch a step that ignores its duration.

use std::time::Duration;

/// Upper bound for any wait on the capture sink.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(4);

/// `stop()` must return within this, sleeps included.
pub const STOP_DEADLINE: Duration = Duration::from_secs(1);

/// Relative slack on the mean spacing of consecutive steps.
pub const STEP_SPACING_SLACK: f64 = 0.4;
