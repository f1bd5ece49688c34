use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const JOIN_POLL: Duration = Duration::from_millis(10);

/// Join `handle` if it finishes within `timeout`.
///
/// Returns `false` and detaches the thread when it is still running at the
/// deadline; std offers no timed join. A timeout too large to represent
/// as an `Instant` waits for the thread indefinitely.
pub(crate) fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now().checked_add(timeout);
    while !handle.is_finished() {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return false;
        }
        thread::sleep(JOIN_POLL);
    }
    let _ = handle.join();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_finished_thread() {
        let handle = thread::spawn(|| {});
        assert!(join_with_timeout(handle, Duration::from_secs(1)));
    }

    #[test]
    fn unrepresentable_timeout_still_joins() {
        let handle = thread::spawn(|| thread::sleep(Duration::from_millis(30)));
        assert!(join_with_timeout(handle, Duration::MAX));
    }

    #[test]
    fn gives_up_on_stuck_thread() {
        let handle = thread::spawn(|| thread::sleep(Duration::from_millis(500)));
        let start = Instant::now();
        assert!(!join_with_timeout(handle, Duration::from_millis(50)));
        assert!(start.elapsed() < Duration::from_millis(400));
    }
}
