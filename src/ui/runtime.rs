use crate::broadcast::Broadcaster;
use crate::ui::dispatch::{UiDispatcher, UiEvent};
use crate::ui::render::draw;
use crate::ui::terminal_guard::setup_terminal;
use crate::ui::viewer::{Viewer, ViewerIntent, ViewerState};
use ratatui::layout::Size;
use std::io;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    /// How often the loop wakes with nothing to do, to notice a stopped
    /// broadcaster.
    pub tick_rate: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "ptytest".to_string(),
            tick_rate: Duration::from_millis(250),
        }
    }
}

/// Apply one dispatcher event to the viewer.
pub fn apply_event(viewer: &mut Viewer, event: UiEvent) {
    match event {
        UiEvent::Key(key) => {
            if let Some(intent) = ViewerIntent::from_key(key) {
                viewer.dispatch(intent);
            }
        }
        UiEvent::Screen(screen) => viewer.dispatch(ViewerIntent::ScreenUpdated(screen)),
    }
}

/// Serve a pending manual refresh with a synchronous read.
pub fn serve_refresh(viewer: &mut Viewer, broadcaster: &Broadcaster) {
    if viewer.state().refresh_pending {
        let screen = Arc::new(broadcaster.get_screen_state());
        viewer.dispatch(ViewerIntent::ScreenUpdated(screen));
    }
}

/// Remembers what was last drawn so unchanged frames are skipped.
#[derive(Debug, Default)]
pub struct RedrawGate {
    last: Option<(ViewerState, Size)>,
}

impl RedrawGate {
    /// Whether `state` at `size` differs from the last drawn frame. Records
    /// it as drawn when it does.
    pub fn needs_draw(&mut self, state: &ViewerState, size: Size) -> bool {
        if self
            .last
            .as_ref()
            .is_some_and(|(last, last_size)| last == state && *last_size == size)
        {
            return false;
        }
        self.last = Some((state.clone(), size));
        true
    }
}

/// Show `broadcaster`'s session full-screen until the user quits.
///
/// Blocks the calling thread, which becomes the only thread that renders.
/// The subscription is removed on every exit path.
pub fn run_viewer(broadcaster: &Broadcaster, options: ViewerOptions) -> io::Result<()> {
    let (mut terminal, guard) = setup_terminal()?;
    let dispatcher = UiDispatcher::new();

    let id = broadcaster.subscribe(dispatcher.screen_callback());
    let _subscription = scopeguard::guard(id, |id| broadcaster.unsubscribe(id));
    let input = dispatcher.spawn_input_reader()?;

    let mut viewer = Viewer::new(options.title);
    viewer.dispatch(ViewerIntent::RequestRefresh);
    serve_refresh(&mut viewer, broadcaster);
    tracing::info!(subscriber = %id, "viewer attached");

    let mut gate = RedrawGate::default();
    loop {
        if gate.needs_draw(viewer.state(), terminal.size()?) {
            terminal.draw(|frame| draw(frame, viewer.state()))?;
        }
        if viewer.state().should_quit {
            break;
        }

        match dispatcher.next(options.tick_rate) {
            Some(event) => apply_event(&mut viewer, event),
            None => {
                if !viewer.state().source_stopped && !broadcaster.is_running() {
                    viewer.dispatch(ViewerIntent::SourceStopped);
                }
            }
        }
        serve_refresh(&mut viewer, broadcaster);
    }

    drop(input);
    drop(guard);
    tracing::info!(subscriber = %id, "viewer detached");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::BufferSnapshot;

    #[test]
    fn unchanged_frames_are_skipped() {
        let mut gate = RedrawGate::default();
        let size = Size::new(80, 24);
        let mut viewer = Viewer::new("demo");
        assert!(gate.needs_draw(viewer.state(), size));
        assert!(!gate.needs_draw(viewer.state(), size));

        let screen = Arc::new(BufferSnapshot::new(vec!["hi".to_string()], 2, 0));
        viewer.dispatch(ViewerIntent::ScreenUpdated(screen));
        assert!(gate.needs_draw(viewer.state(), size));
        assert!(!gate.needs_draw(viewer.state(), size));
    }

    #[test]
    fn resize_forces_a_redraw() {
        let mut gate = RedrawGate::default();
        let viewer = Viewer::new("demo");
        assert!(gate.needs_draw(viewer.state(), Size::new(80, 24)));
        assert!(gate.needs_draw(viewer.state(), Size::new(100, 30)));
    }
}
