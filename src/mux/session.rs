use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::{output_lines, output_number, MuxExecutor, TmuxCli};
use crate::error::{MuxError, Result};
use crate::session::{Session, SessionBuilder, TerminalSession};

/// tmux's default prefix, Ctrl-b.
const PREFIX: &str = "\x02";
const PREFIX_PAUSE: Duration = Duration::from_millis(50);
const SPLIT_SETTLE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Side by side (`-h`).
    Horizontal,
    /// Stacked (`-v`).
    Vertical,
}

impl SplitDirection {
    fn flag(self) -> &'static str {
        match self {
            SplitDirection::Horizontal => "-h",
            SplitDirection::Vertical => "-v",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TmuxOptions {
    /// Session name; `ptytest-<8 hex>` when `None`.
    pub name: Option<String>,
    pub width: u16,
    pub height: u16,
    pub timeout: Duration,
    /// Load the user's tmux config. Off means `-f /dev/null`.
    pub use_config: bool,
    pub shell: String,
    /// Pause after attaching, while the shell comes up.
    pub startup_delay: Duration,
    /// Whether `get_content` (and so every text assertion) sees scrollback
    /// or only the visible pane.
    pub include_history: bool,
}

impl Default for TmuxOptions {
    fn default() -> Self {
        Self {
            name: None,
            width: 120,
            height: 40,
            timeout: Duration::from_secs(5),
            use_config: true,
            shell: std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string()),
            startup_delay: Duration::from_millis(500),
            include_history: true,
        }
    }
}

impl TmuxOptions {
    fn new_session_args(&self, name: &str) -> Vec<String> {
        let mut args = Vec::new();
        if !self.use_config {
            args.extend(["-f".to_string(), "/dev/null".to_string()]);
        }
        args.extend([
            "new-session".to_string(),
            "-d".to_string(),
            "-s".to_string(),
            name.to_string(),
            "-x".to_string(),
            self.width.to_string(),
            "-y".to_string(),
            self.height.to_string(),
            self.shell.clone(),
        ]);
        args
    }
}

fn generated_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("ptytest-{}", &id[..8])
}

/// A detached tmux session with a pty client attached to it.
///
/// Keys go through the attached client; screen content comes from
/// `capture-pane`, so pane layout and scrollback are tmux's own.
pub struct TmuxSession {
    name: String,
    executor: Box<dyn MuxExecutor>,
    client: Session,
    include_history: bool,
    cleaned_up: AtomicBool,
}

impl TmuxSession {
    pub fn new(options: TmuxOptions) -> Result<Self> {
        Self::with_executor(options, Box::new(TmuxCli::new()))
    }

    pub fn with_executor(options: TmuxOptions, executor: Box<dyn MuxExecutor>) -> Result<Self> {
        let name = options.name.clone().unwrap_or_else(generated_name);
        let args = options.new_session_args(&name);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        executor.run(&args)?;
        tracing::debug!(session = %name, "created tmux session");

        let client = SessionBuilder::new(executor.program())
            .args(["attach-session", "-t", name.as_str()])
            .size(options.width, options.height)
            .timeout(options.timeout)
            .startup_delay(options.startup_delay)
            .spawn();
        let client = match client {
            Ok(client) => client,
            Err(err) => {
                let _ = executor.run(&["kill-session", "-t", &name]);
                return Err(err);
            }
        };

        Ok(Self {
            name,
            executor,
            client,
            include_history: options.include_history,
            cleaned_up: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn tmux(&self, args: &[&str]) -> Result<String> {
        Ok(self.executor.run(args)?)
    }

    /// Ctrl-b, a short pause, then `key`.
    pub fn send_prefix_key(&self, key: &str, delay: Option<Duration>) -> Result<()> {
        self.client.send_raw(PREFIX, Some(Duration::ZERO))?;
        thread::sleep(PREFIX_PAUSE);
        self.client.send_raw(key, delay)
    }

    /// Active pane text, optionally with all scrollback.
    pub fn capture(&self, include_history: bool) -> Result<String> {
        let mut args = vec!["capture-pane", "-p", "-t", self.name.as_str()];
        if include_history {
            args.extend(["-S", "-"]);
        }
        self.tmux(&args)
    }

    /// Visible text of `pane`, or of the active pane.
    pub fn get_pane_content(&self, pane: Option<&str>) -> Result<String> {
        let target = pane.unwrap_or(&self.name);
        self.tmux(&["capture-pane", "-p", "-t", target])
    }

    pub fn pane_ids(&self) -> Result<Vec<String>> {
        let out = self.tmux(&["list-panes", "-t", &self.name, "-F", "#{pane_id}"])?;
        Ok(output_lines(&out))
    }

    pub fn pane_count(&self) -> Result<usize> {
        let out = self.tmux(&["list-panes", "-t", &self.name])?;
        Ok(output_lines(&out).len())
    }

    pub fn split_window(&self, direction: SplitDirection) -> Result<()> {
        self.tmux(&["split-window", direction.flag(), "-t", &self.name])?;
        thread::sleep(SPLIT_SETTLE);
        Ok(())
    }

    pub fn pane_height(&self, pane: Option<&str>) -> Result<u16> {
        self.pane_format(pane, "#{pane_height}")
    }

    pub fn pane_width(&self, pane: Option<&str>) -> Result<u16> {
        self.pane_format(pane, "#{pane_width}")
    }

    fn pane_format(&self, pane: Option<&str>, format: &str) -> Result<u16> {
        let target = pane.unwrap_or(&self.name);
        let out = self.tmux(&["display-message", "-p", "-t", target, format])?;
        Ok(output_number(&out))
    }

    /// Value of a global option; empty when it is unset.
    pub fn global_option(&self, option: &str) -> Result<String> {
        match self.executor.run(&["show-option", "-gv", option]) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(MuxError::CommandFailed { .. }) => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn session_exists(&self) -> bool {
        self.executor.succeeds(&["has-session", "-t", &self.name])
    }

    /// The attached client session.
    pub fn client(&self) -> &Session {
        &self.client
    }
}

impl TerminalSession for TmuxSession {
    fn send_keys_with(&self, text: &str, delay: Option<Duration>, literal: bool) -> Result<()> {
        self.client.send_keys_with(text, delay, literal)
    }

    fn send_raw(&self, sequence: &str, delay: Option<Duration>) -> Result<()> {
        self.client.send_raw(sequence, delay)
    }

    /// Pane text, with scrollback unless `include_history` is off. Falls
    /// back to the client's screen if tmux cannot be asked.
    fn get_content(&self) -> String {
        match self.capture(self.include_history) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(session = %self.name, error = %err, "capture-pane failed");
                self.client.get_content()
            }
        }
    }

    fn cleanup(&self) {
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.executor.run(&["kill-session", "-t", &self.name]) {
            tracing::debug!(session = %self.name, error = %err, "kill-session failed");
        }
        self.client.cleanup();
        tracing::debug!(session = %self.name, "tmux session cleaned up");
    }

    fn default_timeout(&self) -> Duration {
        self.client.default_timeout()
    }

    fn poll_interval(&self) -> Duration {
        self.client.poll_interval()
    }
}

impl Drop for TmuxSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}
