//! Configuration file support.
//!
//! Every field has a serde default, so an empty or missing file yields a
//! usable [`Config`]. Values here only seed [`crate::SessionBuilder`] and
//! [`crate::Broadcaster`]; builders can override each of them.

mod loader;
mod types;

pub use loader::{ConfigError, CONFIG_ENV_VAR, MAX_POLL_INTERVAL_MS};
pub use types::{BroadcastConfig, Config, LoggingConfig, SessionDefaults};
