use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;

use crate::pty::BufferSnapshot;
use crate::ui::mvi::Intent;

#[derive(Debug)]
pub enum ViewerIntent {
    /// A new screen state, from the broadcaster or a manual refresh.
    ScreenUpdated(Arc<BufferSnapshot>),
    RequestRefresh,
    SourceStopped,
    Quit,
}

impl Intent for ViewerIntent {}

impl ViewerIntent {
    /// Map a key press to an intent. The viewer is read-only, so anything
    /// else is ignored.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Self::Quit)
            }
            KeyCode::Char('r') => Some(Self::RequestRefresh),
            _ => None,
        }
    }
}
