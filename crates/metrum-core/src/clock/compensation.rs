//! Drift compensation for step sleeps.
//!
//! A worker that finishes a bar late carries the lateness (debt) into the next
//! bar. Each step then sleeps a little less, proportional to its share of the bar,
//! and also absorbs the overrun of the previous step's sleep.

/// Corrected sleep for one step, in microseconds.
///
/// `t = dur - round(dur / bar * debt + overrun)`. Falls back to the raw `dur`
/// when the correction would leave `t` outside `(0, bar)`.
pub fn corrected_sleep_us(dur_us: f64, bar_us: f64, debt_us: f64, overrun_us: f64) -> f64 {
    if bar_us.is_nan() || bar_us <= 0.0 {
        return dur_us;
    }
    let t = dur_us - (dur_us / bar_us * debt_us + overrun_us).round();
    if t > 0.0 && t < bar_us {
        t
    } else {
        dur_us
    }
}

/// Debt left by a bar that took `elapsed_us` against a nominal `bar_us`.
#[inline]
pub fn bar_debt_us(elapsed_us: f64, bar_us: f64) -> f64 {
    (elapsed_us - bar_us).max(0.0)
}

/// Overrun of a sleep that was asked for `requested_us` and took `elapsed_us`.
#[inline]
pub fn sleep_overrun_us(elapsed_us: f64, requested_us: f64) -> f64 {
    (elapsed_us - requested_us).max(0.0)
}
