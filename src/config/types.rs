use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionDefaults,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied to every session built without explicit overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Terminal width in columns.
    #[serde(default = "default_width")]
    pub width: u16,
    /// Terminal height in rows.
    #[serde(default = "default_height")]
    pub height: u16,
    /// Default timeout for `verify_*` / `wait_*` in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Pause after each `send_keys` / `send_raw` in milliseconds.
    #[serde(default = "default_key_delay_ms")]
    pub key_delay_ms: u64,
    /// Polling granularity for screen assertions (1..=100 ms).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long cleanup waits after the graceful signal before killing.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
    /// Value exported as `TERM` to the child.
    #[serde(default = "default_term")]
    pub term: String,
}

/// Broadcaster tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Sampling interval of the background poller in milliseconds.
    #[serde(default = "default_broadcast_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on how long `shutdown` waits for the poller to exit.
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
    /// Whether a cursor move without a line change counts as a change.
    #[serde(default = "default_notify_on_cursor")]
    pub notify_on_cursor: bool,
}

/// Log output settings used by the `ptytest` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `PTYTEST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs here instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_width() -> u16 {
    120
}

fn default_height() -> u16 {
    40
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_key_delay_ms() -> u64 {
    150
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_grace_period_ms() -> u64 {
    500
}

fn default_term() -> String {
    "xterm-256color".to_string()
}

fn default_broadcast_interval_ms() -> u64 {
    100
}

fn default_join_timeout_ms() -> u64 {
    1_000
}

fn default_notify_on_cursor() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            timeout_ms: default_timeout_ms(),
            key_delay_ms: default_key_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            grace_period_ms: default_grace_period_ms(),
            term: default_term(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_broadcast_interval_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            notify_on_cursor: default_notify_on_cursor(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
