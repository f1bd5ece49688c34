//! Drive interactive terminal programs through a real pty and assert on
//! what they render.
//!
//! ```no_run
//! use ptytest::{SessionBuilder, TerminalSession};
//!
//! # fn main() -> ptytest::Result<()> {
//! let session = SessionBuilder::new("bash").size(80, 24).spawn()?;
//! session.send_keys("echo hello")?;
//! session.wait_for_text("hello", None)?;
//! session.cleanup();
//! # Ok(())
//! # }
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod mux;
pub mod neovim;
pub mod pty;
pub mod session;
pub mod ui;

mod util;

pub use broadcast::{Broadcaster, SubscriptionId};
pub use config::Config;
pub use error::{MuxError, Result, SessionError, SubscriberError};
pub use keys::Keys;
pub use mux::{SplitDirection, TmuxOptions, TmuxSession};
pub use neovim::{Mode, NeovimOptions, NeovimSession};
pub use pty::BufferSnapshot;
pub use session::{Session, SessionBuilder, SessionConfig, SessionState, TerminalSession};
