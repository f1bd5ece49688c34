//! Read-only terminal viewer fed by a [`Broadcaster`](crate::broadcast::Broadcaster).

pub mod dispatch;
pub mod footer;
pub mod header;
pub mod layout;
pub mod mvi;
pub mod render;
pub mod runtime;
pub mod screen;
pub mod terminal_guard;
pub mod theme;
pub mod viewer;

pub use dispatch::{UiDispatcher, UiEvent};
pub use runtime::{run_viewer, ViewerOptions};
pub use viewer::{Viewer, ViewerIntent, ViewerReducer, ViewerState};
