//! Terminal multiplexer plumbing.
//!
//! tmux is driven purely through its command line: arguments go in, stdout
//! comes back as text. [`MuxExecutor`] is that seam; [`TmuxCli`] runs the
//! real binary.

mod session;

pub use session::{SplitDirection, TmuxOptions, TmuxSession};

use std::io;
use std::process::Command;

use crate::error::MuxError;

/// Runs multiplexer commands and returns their stdout.
pub trait MuxExecutor: Send + Sync {
    /// Binary name, used to start attach clients.
    fn program(&self) -> &str;

    /// Run with `args`. A non-zero exit is an error carrying stderr.
    fn run(&self, args: &[&str]) -> Result<String, MuxError>;

    /// Whether the command exits successfully.
    fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).is_ok()
    }
}

/// The `tmux` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    program: String,
}

impl Default for TmuxCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TmuxCli {
    pub fn new() -> Self {
        Self::with_program("tmux")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `tmux -V` output, e.g. `tmux 3.4`.
    pub fn version(&self) -> Result<String, MuxError> {
        self.run(&["-V"]).map(|out| out.trim().to_string())
    }
}

impl MuxExecutor for TmuxCli {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        tracing::trace!(program = %self.program, ?args, "running multiplexer command");
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => MuxError::NotFound {
                    program: self.program.clone(),
                },
                _ => MuxError::Io {
                    program: self.program.clone(),
                    source,
                },
            })?;

        if !output.status.success() {
            return Err(MuxError::CommandFailed {
                program: self.program.clone(),
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Non-empty trimmed lines of command output.
pub(crate) fn output_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// A single number printed by `display-message`; blank or garbage reads
/// as zero.
pub(crate) fn output_number(stdout: &str) -> u16 {
    stdout.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_maps_to_not_found() {
        let cli = TmuxCli::with_program("ptytest-definitely-not-a-binary");
        assert!(matches!(cli.run(&["-V"]), Err(MuxError::NotFound { .. })));
        assert!(!cli.succeeds(&["-V"]));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_carries_stderr() {
        let cli = TmuxCli::with_program("sh");
        let err = cli.run(&["-c", "echo nope >&2; exit 3"]).unwrap_err();
        match err {
            MuxError::CommandFailed { stderr, args, .. } => {
                assert_eq!(stderr, "nope");
                assert!(args.starts_with("-c"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_returned_as_text() {
        let cli = TmuxCli::with_program("sh");
        assert_eq!(cli.run(&["-c", "printf 'a\\nb\\n'"]).unwrap(), "a\nb\n");
    }

    #[test]
    fn parses_output_helpers() {
        assert_eq!(output_lines("%0\n%1\n\n"), vec!["%0", "%1"]);
        assert!(output_lines("  \n").is_empty());
        assert_eq!(output_number("40\n"), 40);
        assert_eq!(output_number(""), 0);
        assert_eq!(output_number("abc"), 0);
    }
}
