use std::sync::atomic::{AtomicU8, Ordering};

/// Where a session is in its life. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum SessionState {
    Created = 0,
    Running = 1,
    CleaningUp = 2,
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Created,
            1 => SessionState::Running,
            2 => SessionState::CleaningUp,
            _ => SessionState::Closed,
        }
    }
}

/// Atomic holder for [`SessionState`].
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Created as u8),
        }
    }

    pub(crate) fn get(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next` if that is a step forward. Returns whether it moved.
    pub(crate) fn advance(&self, next: SessionState) -> bool {
        let mut current = self.state.load(Ordering::SeqCst);
        loop {
            if next as u8 <= current {
                return false;
            }
            match self.state.compare_exchange(
                current,
                next as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    tracing::debug!(
                        from = ?SessionState::from_u8(current),
                        to = ?next,
                        "session state"
                    );
                    return true;
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Claim the cleanup. Only the first caller gets `true`.
    pub(crate) fn begin_cleanup(&self) -> bool {
        self.advance(SessionState::CleaningUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_forward_only() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.get(), SessionState::Created);
        assert!(lifecycle.advance(SessionState::Running));
        assert!(!lifecycle.advance(SessionState::Created));
        assert!(!lifecycle.advance(SessionState::Running));
        assert_eq!(lifecycle.get(), SessionState::Running);
    }

    #[test]
    fn cleanup_claimed_once() {
        let lifecycle = Lifecycle::new();
        lifecycle.advance(SessionState::Running);
        assert!(lifecycle.begin_cleanup());
        assert!(!lifecycle.begin_cleanup());
        lifecycle.advance(SessionState::Closed);
        assert!(!lifecycle.begin_cleanup());
        assert_eq!(lifecycle.get(), SessionState::Closed);
    }

    #[test]
    fn created_session_can_be_cleaned_up() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.begin_cleanup());
    }
}
