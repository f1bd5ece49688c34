use crate::ui::mvi::Reducer;

use super::intent::ViewerIntent;
use super::state::ViewerState;

pub struct ViewerReducer;

impl Reducer for ViewerReducer {
    type State = ViewerState;
    type Intent = ViewerIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ViewerIntent::ScreenUpdated(screen) => ViewerState {
                screen: Some(screen),
                updates: state.updates + 1,
                refresh_pending: false,
                ..state
            },
            ViewerIntent::RequestRefresh => ViewerState {
                refresh_pending: true,
                ..state
            },
            ViewerIntent::SourceStopped => ViewerState {
                source_stopped: true,
                ..state
            },
            ViewerIntent::Quit => ViewerState {
                should_quit: true,
                ..state
            },
        }
    }
}
