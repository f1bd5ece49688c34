use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to a test driver by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A write or read was attempted after the child exited or the session
    /// was cleaned up.
    #[error("process not running")]
    ProcessNotRunning,

    /// The sought text did not show up before the deadline.
    ///
    /// `content` is the screen as last observed, so a failure can be
    /// diagnosed without replaying the session.
    #[error("text '{text}' did not appear within {:.1}s\ncurrent content:\n{content}", .timeout.as_secs_f64())]
    Timeout {
        text: String,
        timeout: Duration,
        content: String,
    },

    /// The sought text was still on screen at the deadline.
    #[error("text '{text}' still present after {:.1}s\ncurrent content:\n{content}", .timeout.as_secs_f64())]
    StillPresent {
        text: String,
        timeout: Duration,
        content: String,
    },

    /// A state check on the driven program did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// The program answered a query with something that could not be
    /// parsed.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("pty I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from shelling out to the terminal multiplexer.
#[derive(Debug, Error)]
pub enum MuxError {
    #[error("{program} not found in PATH")]
    NotFound { program: String },

    #[error("{program} {args} failed: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        stderr: String,
    },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure reported by a broadcaster subscriber callback.
///
/// The broadcaster logs and discards these; they never reach the driver.
#[derive(Debug, Error)]
#[error("subscriber failed: {message}")]
pub struct SubscriberError {
    pub message: String,
}

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_embeds_text_and_content() {
        let err = SessionError::Timeout {
            text: "absent".to_string(),
            timeout: Duration::from_millis(500),
            content: "$ echo actual\nactual".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("'absent'"));
        assert!(message.contains("0.5s"));
        assert!(message.contains("actual"));
    }

    #[test]
    fn command_failed_lists_args() {
        let err = MuxError::CommandFailed {
            program: "tmux".to_string(),
            args: "kill-session -t x".to_string(),
            stderr: "can't find session: x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tmux kill-session -t x failed: can't find session: x"
        );
    }
}
