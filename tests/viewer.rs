mod common;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::sync::Arc;
use std::time::Duration;

use common::bare_buffer;
use ptytest::config::BroadcastConfig;
use ptytest::ui::render::{draw, WAITING_MESSAGE};
use ptytest::ui::runtime::{apply_event, serve_refresh};
use ptytest::ui::{UiDispatcher, UiEvent, Viewer};
use ptytest::Broadcaster;

fn screen_text(viewer: &Viewer) -> String {
    let mut terminal = Terminal::new(TestBackend::new(50, 10)).unwrap();
    terminal.draw(|frame| draw(frame, viewer.state())).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[test]
fn broadcast_updates_reach_the_viewer() {
    let buffer = bare_buffer(4, 30);
    let broadcaster = Broadcaster::from_buffer(
        buffer.clone(),
        &BroadcastConfig {
            poll_interval_ms: 10,
            ..BroadcastConfig::default()
        },
    );
    let dispatcher = UiDispatcher::new();
    broadcaster.subscribe(dispatcher.screen_callback());

    let mut viewer = Viewer::new("demo");
    assert!(screen_text(&viewer).contains(WAITING_MESSAGE));

    broadcaster.start().unwrap();
    buffer.lock().feed(b"hello viewer");

    let mut seen = false;
    for _ in 0..50 {
        if let Some(event) = dispatcher.next(Duration::from_millis(100)) {
            apply_event(&mut viewer, event);
            if screen_text(&viewer).contains("hello viewer") {
                seen = true;
                break;
            }
        }
    }
    broadcaster.shutdown();
    assert!(seen);
    assert!(viewer.state().updates >= 1);
}

#[test]
fn refresh_key_reads_screen_synchronously() {
    let buffer = bare_buffer(4, 30);
    buffer.lock().feed(b"already there");
    let broadcaster = Broadcaster::from_buffer(buffer, &BroadcastConfig::default());

    let mut viewer = Viewer::new("demo");
    apply_event(
        &mut viewer,
        UiEvent::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE)),
    );
    assert!(viewer.state().refresh_pending);
    serve_refresh(&mut viewer, &broadcaster);
    assert!(!viewer.state().refresh_pending);
    assert!(screen_text(&viewer).contains("already there"));
}

#[test]
fn quit_keys_stop_the_viewer() {
    for key in [
        KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
    ] {
        let mut viewer = Viewer::new("demo");
        apply_event(&mut viewer, UiEvent::Key(key));
        assert!(viewer.state().should_quit);
    }
}

#[test]
fn closed_viewer_fails_its_subscription_quietly() {
    let buffer = bare_buffer(2, 10);
    let broadcaster = Broadcaster::from_buffer(
        buffer.clone(),
        &BroadcastConfig {
            poll_interval_ms: 10,
            ..BroadcastConfig::default()
        },
    );
    let dispatcher = UiDispatcher::new();
    let callback = dispatcher.screen_callback();
    drop(dispatcher);
    assert!(callback(&Arc::new(broadcaster.get_screen_state())).is_err());

    broadcaster.subscribe(callback);
    broadcaster.start().unwrap();
    buffer.lock().feed(b"x");
    std::thread::sleep(Duration::from_millis(50));
    assert!(broadcaster.is_running());
    broadcaster.shutdown();
}
