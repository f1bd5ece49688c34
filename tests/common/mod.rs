//! Shared test utilities and fake pty infrastructure.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use ptytest::pty::emulator::{self, SharedBuffer};
use ptytest::pty::ProcessHandle;
use ptytest::{Session, SessionConfig};

pub type SpyBuffer = Arc<Mutex<Vec<u8>>>;

/// Write a config file into a fresh temp dir.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

// -- Fake process -------------------------------------------------------------

/// Process stand-in that echoes writes into a real emulator and records
/// every byte and terminate call.
pub struct FakeProcess {
    pub written: SpyBuffer,
    pub buffer: SharedBuffer,
    pub alive: Arc<AtomicBool>,
    /// Whether a graceful terminate stops the fake.
    pub obeys_sigterm: bool,
    pub graceful_calls: Arc<AtomicUsize>,
    pub forced_calls: Arc<AtomicUsize>,
}

impl ProcessHandle for FakeProcess {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if !self.is_alive() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "fake exited"));
        }
        self.written.lock().extend_from_slice(bytes);
        self.buffer.lock().feed(bytes);
        Ok(())
    }

    fn terminate(&self, force: bool) -> io::Result<()> {
        if force {
            self.forced_calls.fetch_add(1, Ordering::SeqCst);
            self.alive.store(false, Ordering::SeqCst);
        } else {
            self.graceful_calls.fetch_add(1, Ordering::SeqCst);
            if self.obeys_sigterm {
                self.alive.store(false, Ordering::SeqCst);
            }
        }
        Ok(())
    }
}

/// Handles into a fake session's internals.
pub struct FakeParts {
    pub written: SpyBuffer,
    pub buffer: SharedBuffer,
    pub alive: Arc<AtomicBool>,
    pub graceful_calls: Arc<AtomicUsize>,
    pub forced_calls: Arc<AtomicUsize>,
}

/// Fast config for fake sessions: no key delay, short grace period.
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        width: 40,
        height: 6,
        timeout: Duration::from_millis(500),
        key_delay: Duration::ZERO,
        poll_interval: Duration::from_millis(10),
        grace_period: Duration::from_millis(100),
        startup_delay: Duration::ZERO,
        ..SessionConfig::new("fake")
    }
}

/// Session over a [`FakeProcess`] and a real emulator.
pub fn fake_session(obeys_sigterm: bool) -> (Session, FakeParts) {
    let config = fast_config();
    let buffer = emulator::shared(emulator::create(config.height, config.width));
    let parts = FakeParts {
        written: Arc::new(Mutex::new(Vec::new())),
        buffer: SharedBuffer::clone(&buffer),
        alive: Arc::new(AtomicBool::new(true)),
        graceful_calls: Arc::new(AtomicUsize::new(0)),
        forced_calls: Arc::new(AtomicUsize::new(0)),
    };
    let process = FakeProcess {
        written: Arc::clone(&parts.written),
        buffer: SharedBuffer::clone(&buffer),
        alive: Arc::clone(&parts.alive),
        obeys_sigterm,
        graceful_calls: Arc::clone(&parts.graceful_calls),
        forced_calls: Arc::clone(&parts.forced_calls),
    };
    (Session::with_parts(Box::new(process), buffer, config), parts)
}

/// Shared buffer with no process behind it.
pub fn bare_buffer(rows: u16, cols: u16) -> SharedBuffer {
    emulator::shared(emulator::create(rows, cols))
}

/// Whether `program` resolves on `PATH`.
pub fn on_path(program: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| dir.join(program).is_file())
    })
}
