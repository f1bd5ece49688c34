pub mod emulator;
mod handle;
mod snapshot;
mod spawn;

pub use emulator::{CursorState, SharedBuffer, TerminalBuffer};
pub use handle::{ProcessHandle, PtyProcess, SharedWriter};
pub use snapshot::BufferSnapshot;
pub use spawn::{spawn, SpawnSpec};
