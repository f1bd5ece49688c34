use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Environment variable holding a filter directive, e.g. `ptytest=debug`.
pub const LOG_ENV_VAR: &str = "PTYTEST_LOG";

fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber. Logs go to `config.file` when set,
/// otherwise stderr. A subscriber installed earlier (e.g. by a test
/// harness) is left in place.
pub fn init_tracing(config: &LoggingConfig) -> io::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "debug".to_string(),
            file: Some(dir.path().join("ptytest.log")),
        };
        init_tracing(&config).unwrap();
        init_tracing(&config).unwrap();
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let config = LoggingConfig {
            level: "info".to_string(),
            file: Some("/nonexistent-dir/ptytest.log".into()),
        };
        assert!(init_tracing(&config).is_err());
    }
}
