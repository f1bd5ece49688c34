use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on how long a polling assertion sleeps between checks.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Check `predicate` until it holds or `timeout` elapses.
///
/// Sleeps `interval` (clamped to [`MAX_POLL_INTERVAL`]) between checks and
/// always checks once more at the deadline, so a condition that becomes true
/// during the last sleep is still seen. A timeout too large to represent
/// as an `Instant` never expires.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let interval = interval.clamp(Duration::from_millis(1), MAX_POLL_INTERVAL);
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if predicate() {
            return true;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        thread::sleep(pause);
    }
}
