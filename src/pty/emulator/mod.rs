mod alacritty_impl;

use parking_lot::Mutex;
use std::sync::Arc;

/// Cursor position and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub row: u16,
    pub col: u16,
    pub visible: bool,
}

/// Backend-agnostic terminal emulator interface.
///
/// Implementations wrap a concrete terminal emulation library (e.g.
/// `alacritty_terminal`) and expose a uniform API consumed by the rest of the
/// codebase.  Only the implementation file should depend on the underlying
/// library crate.
pub trait TerminalBuffer: Send {
    /// Feed raw bytes from the PTY into the emulator.
    fn feed(&mut self, bytes: &[u8]);

    /// Resize the virtual terminal.
    fn set_size(&mut self, rows: u16, cols: u16);

    /// Current `(rows, cols)`.
    fn size(&self) -> (u16, u16);

    /// Visible rows, top to bottom, trailing blanks trimmed.
    fn lines(&self) -> Vec<String>;

    /// Current cursor state.
    fn cursor(&self) -> CursorState;

    /// Bytes the emulator wants written back to the child (cursor position
    /// reports, device attributes). Drained on every call.
    fn take_replies(&mut self) -> Vec<u8> {
        Vec::new()
    }
}

/// The one lock every reader and the output feeder go through.
pub type SharedBuffer = Arc<Mutex<Box<dyn TerminalBuffer>>>;

/// Create a terminal emulator backed by the default implementation.
///
/// This is the single point where the concrete backend is chosen.  To switch
/// to a different library, change only this function and the implementation
/// module.
pub fn create(rows: u16, cols: u16) -> Box<dyn TerminalBuffer> {
    Box::new(alacritty_impl::AlacrittyEmulator::new(rows, cols))
}

pub fn shared(buffer: Box<dyn TerminalBuffer>) -> SharedBuffer {
    Arc::new(Mutex::new(buffer))
}
