//! Driving a terminal program and asserting on its screen.
//!
//! [`Session`] is the pty-backed driver. [`TerminalSession`] is the surface
//! it shares with the tmux and Neovim sessions, and carries the polling
//! assertions so every backend waits the same way.

mod lifecycle;
mod pty_session;
mod wait;

pub use lifecycle::SessionState;
pub use pty_session::{Session, SessionBuilder, SessionConfig};
pub use wait::{poll_until, MAX_POLL_INTERVAL};

use std::time::Duration;

use crate::error::{Result, SessionError};

/// Enter as the pty sees it.
pub const ENTER: &str = "\r";

/// Keystroke and screen-reading surface shared by every session kind.
pub trait TerminalSession {
    /// Write `text`, then Enter unless `literal`, then sleep `delay`
    /// (the session's key delay when `None`).
    fn send_keys_with(&self, text: &str, delay: Option<Duration>, literal: bool) -> Result<()>;

    /// Write `sequence` exactly as given, then sleep `delay`.
    fn send_raw(&self, sequence: &str, delay: Option<Duration>) -> Result<()>;

    /// Current visible screen, rows joined by `\n`.
    fn get_content(&self) -> String;

    /// Stop the program and release everything. Idempotent, never fails.
    fn cleanup(&self);

    /// Timeout used when an assertion is given `None`.
    fn default_timeout(&self) -> Duration;

    /// Sleep between assertion checks.
    fn poll_interval(&self) -> Duration {
        MAX_POLL_INTERVAL
    }

    /// Type `text` and press Enter.
    fn send_keys(&self, text: &str) -> Result<()> {
        self.send_keys_with(text, None, false)
    }

    /// Type `text` without pressing Enter.
    fn type_literal(&self, text: &str) -> Result<()> {
        self.send_keys_with(text, None, true)
    }

    /// Whether `text` shows up on screen within `timeout`.
    fn verify_text_appears(&self, text: &str, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        poll_until(timeout, self.poll_interval(), || {
            self.get_content().contains(text)
        })
    }

    /// Like [`verify_text_appears`](Self::verify_text_appears) but fails
    /// with the last observed screen.
    fn wait_for_text(&self, text: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        if self.verify_text_appears(text, Some(timeout)) {
            return Ok(());
        }
        Err(SessionError::Timeout {
            text: text.to_string(),
            timeout,
            content: self.get_content(),
        })
    }

    /// Whether `text` is gone from the screen within `timeout`.
    fn verify_text_disappears(&self, text: &str, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        poll_until(timeout, self.poll_interval(), || {
            !self.get_content().contains(text)
        })
    }

    fn wait_for_text_to_disappear(&self, text: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.default_timeout());
        if self.verify_text_disappears(text, Some(timeout)) {
            return Ok(());
        }
        Err(SessionError::StillPresent {
            text: text.to_string(),
            timeout,
            content: self.get_content(),
        })
    }
}
