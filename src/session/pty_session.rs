use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use super::lifecycle::{Lifecycle, SessionState};
use super::wait::poll_until;
use super::{TerminalSession, ENTER};
use crate::broadcast::Broadcaster;
use crate::config::{BroadcastConfig, SessionDefaults};
use crate::error::{Result, SessionError};
use crate::pty::{self, BufferSnapshot, ProcessHandle, SharedBuffer, SpawnSpec};

const EXIT_POLL: Duration = Duration::from_millis(20);
const FEEDER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything fixed when a session is created.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub program: String,
    pub args: Vec<String>,
    pub width: u16,
    pub height: u16,
    /// Default for assertions given no explicit timeout.
    pub timeout: Duration,
    /// Pause after each write so the program can react.
    pub key_delay: Duration,
    /// Sleep between assertion checks. Never above 100ms.
    pub poll_interval: Duration,
    /// How long cleanup waits after SIGTERM before killing.
    pub grace_period: Duration,
    /// Pause right after spawning.
    pub startup_delay: Duration,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub term: String,
}

impl SessionConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self::from_defaults(program, &SessionDefaults::default())
    }

    pub fn from_defaults(program: impl Into<String>, defaults: &SessionDefaults) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            width: defaults.width,
            height: defaults.height,
            timeout: Duration::from_millis(defaults.timeout_ms),
            key_delay: Duration::from_millis(defaults.key_delay_ms),
            poll_interval: Duration::from_millis(defaults.poll_interval_ms),
            grace_period: Duration::from_millis(defaults.grace_period_ms),
            startup_delay: Duration::from_millis(100),
            env: Vec::new(),
            cwd: None,
            term: defaults.term.clone(),
        }
    }

    fn spawn_spec(&self) -> SpawnSpec {
        SpawnSpec {
            program: self.program.clone(),
            args: self.args.clone(),
            width: self.width,
            height: self.height,
            env: self.env.clone(),
            cwd: self.cwd.clone(),
            term: self.term.clone(),
        }
    }
}

/// Builder for [`Session`].
///
/// ```no_run
/// use ptytest::{SessionBuilder, TerminalSession};
/// use std::time::Duration;
///
/// let session = SessionBuilder::new("bash")
///     .arg("--norc")
///     .size(80, 24)
///     .timeout(Duration::from_secs(3))
///     .spawn()?;
/// session.send_keys("echo hello")?;
/// session.wait_for_text("hello", None)?;
/// # Ok::<(), ptytest::SessionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    config: SessionConfig,
    broadcast: Option<BroadcastConfig>,
}

impl SessionBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            config: SessionConfig::new(program),
            broadcast: None,
        }
    }

    /// Start from loaded config defaults instead of the built-in ones.
    pub fn with_defaults(program: impl Into<String>, defaults: &SessionDefaults) -> Self {
        Self {
            config: SessionConfig::from_defaults(program, defaults),
            broadcast: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.push((key.into(), value.into()));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.config.cwd = Some(cwd.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn key_delay(mut self, delay: Duration) -> Self {
        self.config.key_delay = delay;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.config.grace_period = grace;
        self
    }

    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.config.startup_delay = delay;
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.config.term = term.into();
        self
    }

    /// Start a [`Broadcaster`] with the session; cleanup shuts it down.
    pub fn broadcast(mut self, config: BroadcastConfig) -> Self {
        self.broadcast = Some(config);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn spawn(self) -> Result<Session> {
        let mut session = Session::spawn(self.config)?;
        if let Some(config) = &self.broadcast {
            session.enable_broadcast(config)?;
        }
        Ok(session)
    }
}

/// A program running on a pty with a live emulated screen.
///
/// The child is stopped when the session is dropped, on every exit path.
pub struct Session {
    process: Box<dyn ProcessHandle>,
    buffer: SharedBuffer,
    config: SessionConfig,
    lifecycle: Lifecycle,
    broadcaster: Option<Broadcaster>,
}

impl Session {
    pub fn spawn(config: SessionConfig) -> Result<Self> {
        let (process, buffer) = pty::spawn(&config.spawn_spec())?;
        let startup_delay = config.startup_delay;
        let session = Self::with_parts(Box::new(process), buffer, config);
        tracing::info!(
            command = %session.config.spawn_spec().display(),
            pid = ?session.pid(),
            "session started"
        );
        if !startup_delay.is_zero() {
            thread::sleep(startup_delay);
        }
        Ok(session)
    }

    /// Assemble a session from an already running process and its buffer.
    pub fn with_parts(
        process: Box<dyn ProcessHandle>,
        buffer: SharedBuffer,
        config: SessionConfig,
    ) -> Self {
        let session = Self {
            process,
            buffer,
            config,
            lifecycle: Lifecycle::new(),
            broadcaster: None,
        };
        session.lifecycle.advance(SessionState::Running);
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The shared screen buffer, for observers such as the broadcaster.
    pub fn buffer(&self) -> SharedBuffer {
        SharedBuffer::clone(&self.buffer)
    }

    /// Start a broadcaster over this session's screen, owned by the
    /// session and shut down by cleanup. Returns the running one if there
    /// is one already.
    pub fn enable_broadcast(&mut self, config: &BroadcastConfig) -> Result<&Broadcaster> {
        self.ensure_running()?;
        let broadcaster = match self.broadcaster.take() {
            Some(broadcaster) => broadcaster,
            None => {
                let broadcaster = Broadcaster::from_buffer(self.buffer(), config);
                broadcaster.start()?;
                tracing::debug!(pid = ?self.pid(), "session broadcaster started");
                broadcaster
            }
        };
        let broadcaster: &Broadcaster = self.broadcaster.insert(broadcaster);
        Ok(broadcaster)
    }

    /// The broadcaster started by [`SessionBuilder::broadcast`] or
    /// [`Session::enable_broadcast`].
    pub fn broadcaster(&self) -> Option<&Broadcaster> {
        self.broadcaster.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.lifecycle.get()
    }

    pub fn is_alive(&self) -> bool {
        self.process.is_alive()
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// Consistent copy of rows and cursor.
    pub fn snapshot(&self) -> BufferSnapshot {
        let buffer = self.buffer.lock();
        BufferSnapshot::capture(&**buffer)
    }

    /// Visible rows, top to bottom.
    pub fn get_screen(&self) -> Vec<String> {
        self.snapshot().lines
    }

    /// Resize both the pty and the emulated screen.
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        self.ensure_running()?;
        self.process.resize(width, height)?;
        self.buffer.lock().set_size(height, width);
        Ok(())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.state() != SessionState::Running || !self.process.is_alive() {
            return Err(SessionError::ProcessNotRunning);
        }
        Ok(())
    }

    fn write_then_pause(&self, bytes: &[u8], delay: Option<Duration>) -> Result<()> {
        self.ensure_running()?;
        self.process.write(bytes)?;
        let delay = delay.unwrap_or(self.config.key_delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }
}

impl TerminalSession for Session {
    fn send_keys_with(&self, text: &str, delay: Option<Duration>, literal: bool) -> Result<()> {
        let mut bytes = text.as_bytes().to_vec();
        if !literal {
            bytes.extend_from_slice(ENTER.as_bytes());
        }
        self.write_then_pause(&bytes, delay)
    }

    fn send_raw(&self, sequence: &str, delay: Option<Duration>) -> Result<()> {
        self.write_then_pause(sequence.as_bytes(), delay)
    }

    fn get_content(&self) -> String {
        self.snapshot().text()
    }

    fn cleanup(&self) {
        if !self.lifecycle.begin_cleanup() {
            return;
        }
        let pid = self.process.pid();
        tracing::debug!(?pid, "cleaning up session");
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.shutdown();
        }

        if self.process.is_alive() {
            if let Err(err) = self.process.terminate(false) {
                tracing::debug!(?pid, error = %err, "graceful terminate failed");
            }
            let exited = poll_until(self.config.grace_period, EXIT_POLL, || {
                !self.process.is_alive()
            });
            if !exited {
                tracing::debug!(?pid, "child ignored terminate, killing");
                if let Err(err) = self.process.terminate(true) {
                    tracing::debug!(?pid, error = %err, "kill failed");
                }
            }
        }

        self.process.release(FEEDER_JOIN_TIMEOUT);
        self.lifecycle.advance(SessionState::Closed);
        tracing::info!(?pid, "session closed");
    }

    fn default_timeout(&self) -> Duration {
        self.config.timeout
    }

    fn poll_interval(&self) -> Duration {
        self.config.poll_interval.min(super::MAX_POLL_INTERVAL)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("program", &self.config.program)
            .field("pid", &self.pid())
            .field("state", &self.state())
            .field("broadcasting", &self.broadcaster.is_some())
            .finish()
    }
}
