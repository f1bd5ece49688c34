use std::sync::Arc;

use crate::pty::BufferSnapshot;
use crate::ui::mvi::UiState;

/// Everything the viewer draws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerState {
    pub title: String,
    /// Last screen received, `None` until the first update.
    pub screen: Option<Arc<BufferSnapshot>>,
    /// Screen updates received so far.
    pub updates: u64,
    /// A manual refresh was asked for and has not been served yet.
    pub refresh_pending: bool,
    /// The broadcaster stopped; the screen will not change any more.
    pub source_stopped: bool,
    pub should_quit: bool,
}

impl UiState for ViewerState {}

impl ViewerState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Whether there is anything worth drawing in the body.
    pub fn has_output(&self) -> bool {
        self.screen.as_ref().is_some_and(|screen| !screen.is_blank())
    }
}
