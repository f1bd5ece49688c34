//! Read-only live view of a broadcast session.
//!
//! - `state.rs` - what is on screen and whether to keep running
//! - `intent.rs` - key presses and screen updates
//! - `reducer.rs` - transitions, no side effects

mod intent;
mod reducer;
mod state;

pub use intent::ViewerIntent;
pub use reducer::ViewerReducer;
pub use state::ViewerState;

use crate::ui::mvi::Reducer;

/// Holds the current [`ViewerState`] and applies intents to it.
#[derive(Debug, Default)]
pub struct Viewer {
    state: ViewerState,
}

impl Viewer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            state: ViewerState::new(title),
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn dispatch(&mut self, intent: ViewerIntent) {
        let state = std::mem::take(&mut self.state);
        self.state = ViewerReducer::reduce(state, intent);
    }
}
