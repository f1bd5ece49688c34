use parking_lot::Mutex;
use portable_pty::{Child, MasterPty, PtySize};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::util::join_with_timeout;

/// Writer half of the pty, shared with the output feeder so terminal replies
/// reach the child through the same path as driver keystrokes.
pub type SharedWriter = Arc<Mutex<Option<Box<dyn Write + Send>>>>;

/// One spawned child bound to a pseudo-terminal.
pub trait ProcessHandle: Send + Sync {
    /// Whether the child is still running.
    fn is_alive(&self) -> bool;

    /// Write bytes to the child's terminal input.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Ask the child to stop. With `force` the child is killed outright;
    /// otherwise it gets SIGTERM (or the platform equivalent).
    fn terminate(&self, force: bool) -> io::Result<()>;

    /// Resize the pty. Backends without a real pty may ignore this.
    fn resize(&self, _cols: u16, _rows: u16) -> io::Result<()> {
        Ok(())
    }

    /// OS process id, when known.
    fn pid(&self) -> Option<u32> {
        None
    }

    /// Drop the pty and wait (bounded) for the output feeder to finish.
    fn release(&self, _timeout: Duration) {}
}

/// `portable-pty` backed process.
pub struct PtyProcess {
    child: Mutex<Box<dyn Child + Send + Sync>>,
    writer: SharedWriter,
    master: Mutex<Option<Box<dyn MasterPty + Send>>>,
    feeder: Mutex<Option<JoinHandle<()>>>,
    pid: Option<u32>,
}

impl PtyProcess {
    pub(crate) fn new(
        child: Box<dyn Child + Send + Sync>,
        writer: SharedWriter,
        master: Box<dyn MasterPty + Send>,
        feeder: JoinHandle<()>,
    ) -> Self {
        let pid = child.process_id();
        Self {
            child: Mutex::new(child),
            writer,
            master: Mutex::new(Some(master)),
            feeder: Mutex::new(Some(feeder)),
            pid,
        }
    }

    fn close_writer(&self) {
        *self.writer.lock() = None;
    }
}

impl ProcessHandle for PtyProcess {
    fn is_alive(&self) -> bool {
        matches!(self.child.lock().try_wait(), Ok(None))
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock();
        let Some(writer) = writer.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pty writer closed"));
        };
        writer.write_all(bytes)?;
        writer.flush()
    }

    fn terminate(&self, force: bool) -> io::Result<()> {
        if !force {
            #[cfg(unix)]
            if let Some(pid) = self.pid {
                // SAFETY: plain kill(2) on a pid we spawned.
                let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
                if rc == 0 {
                    return Ok(());
                }
                return Err(io::Error::last_os_error());
            }
            self.close_writer();
            return Ok(());
        }

        let mut child = self.child.lock();
        child.kill()?;
        // Reap so is_alive() reflects the kill.
        let _ = child.wait();
        Ok(())
    }

    fn resize(&self, cols: u16, rows: u16) -> io::Result<()> {
        let size = PtySize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        };
        if let Some(master) = self.master.lock().as_ref() {
            master
                .resize(size)
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        }
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn release(&self, timeout: Duration) {
        self.close_writer();
        drop(self.master.lock().take());
        if let Some(feeder) = self.feeder.lock().take() {
            if !join_with_timeout(feeder, timeout) {
                tracing::warn!(pid = ?self.pid, "output feeder still running after release");
            }
        }
    }
}
