use parking_lot::Mutex;
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use super::emulator::{self, SharedBuffer};
use super::handle::{PtyProcess, SharedWriter};
use crate::error::SessionError;

/// Everything needed to start a child on a fresh pty.
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    pub program: String,
    pub args: Vec<String>,
    pub width: u16,
    pub height: u16,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub term: String,
}

impl SpawnSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            width: 120,
            height: 40,
            env: Vec::new(),
            cwd: None,
            term: "xterm-256color".to_string(),
        }
    }

    /// Program and args as one shell-ish string, for logs and errors.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        match &self.cwd {
            Some(cwd) => cmd.cwd(cwd),
            None => {
                if let Ok(cwd) = std::env::current_dir() {
                    cmd.cwd(cwd);
                }
            }
        }
        cmd.env("TERM", &self.term);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Start `spec` on a new pty.
///
/// Returns the process handle plus the shared buffer that the output feeder
/// thread keeps up to date. The feeder holds the buffer lock only while a
/// chunk is being parsed, so readers never see a half-applied chunk.
pub fn spawn(spec: &SpawnSpec) -> Result<(PtyProcess, SharedBuffer), SessionError> {
    let spawn_err = |source: anyhow::Error| SessionError::Spawn {
        command: spec.display(),
        source,
    };

    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: spec.height,
            cols: spec.width,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(spawn_err)?;

    let buffer = emulator::shared(emulator::create(spec.height, spec.width));

    let child = pair.slave.spawn_command(spec.command()).map_err(spawn_err)?;
    drop(pair.slave);

    let reader = pair.master.try_clone_reader().map_err(spawn_err)?;
    let writer: SharedWriter = Arc::new(Mutex::new(Some(
        pair.master.take_writer().map_err(spawn_err)?,
    )));

    let feeder = {
        let buffer = Arc::clone(&buffer);
        let writer = Arc::clone(&writer);
        thread::Builder::new()
            .name("ptytest-feeder".to_string())
            .spawn(move || feed_loop(reader, buffer, writer))?
    };

    tracing::debug!(command = %spec.display(), pid = ?child.process_id(), "spawned pty child");
    Ok((PtyProcess::new(child, writer, pair.master, feeder), buffer))
}

fn feed_loop(mut reader: Box<dyn Read + Send>, buffer: SharedBuffer, writer: SharedWriter) {
    let mut chunk = [0u8; 8192];
    loop {
        let count = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(count) => count,
            Err(err) => {
                // EIO is how Linux reports the slave side closing.
                tracing::trace!(error = %err, "pty read ended");
                break;
            }
        };
        let replies = {
            let mut buffer = buffer.lock();
            buffer.feed(&chunk[..count]);
            buffer.take_replies()
        };
        if !replies.is_empty() {
            if let Some(writer) = writer.lock().as_mut() {
                let _ = writer.write_all(&replies);
                let _ = writer.flush();
            }
        }
    }
}
