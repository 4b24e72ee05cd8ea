//! Hybrid sleep/spin delay for sweep pacing
//!
//! Plain `thread::sleep` is bounded by scheduler granularity (one to
//! fifteen milliseconds depending on platform), far too coarse for
//! spreading a per-point settling delay across individual readings.
//! [`precise_sleep`] suspends the thread in conservative half-steps while
//! plenty of time remains, then busy-polls the clock to the deadline.

use std::thread;
use std::time::{Duration, Instant};

/// Remaining time above which the thread is suspended instead of spinning
const SPIN_THRESHOLD: Duration = Duration::from_millis(2);

/// Block the calling thread for `duration` with sub-millisecond accuracy.
///
/// While more than [`SPIN_THRESHOLD`] remains, the thread sleeps for half
/// the remaining time; the half-step can only undershoot, so scheduler
/// overshoot never accumulates. The final stretch busy-polls the clock.
///
/// Never returns before the deadline. A zero duration returns immediately.
pub fn precise_sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let deadline = Instant::now() + duration;

    loop {
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(r) if !r.is_zero() => r,
            _ => return,
        };

        if remaining > SPIN_THRESHOLD {
            thread::sleep(remaining / 2);
        } else {
            std::hint::spin_loop();
        }
    }
}
