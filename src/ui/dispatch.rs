//! Marshals everything the viewer reacts to onto the thread that owns the
//! terminal.
//!
//! Broadcaster callbacks run on the broadcaster thread and key presses are
//! read on an input thread; both only ever send into this channel. The UI
//! thread drains it and is the only one that renders.

use crossterm::event::{self, Event, KeyEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::SubscriberError;
use crate::pty::BufferSnapshot;

const INPUT_POLL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum UiEvent {
    Key(KeyEvent),
    Screen(Arc<BufferSnapshot>),
}

pub struct UiDispatcher {
    rx: Receiver<UiEvent>,
    tx: Sender<UiEvent>,
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    /// Next event, or `None` once `timeout` passes without one.
    ///
    /// The dispatcher keeps a sender of its own, so the channel never
    /// disconnects while it is alive.
    pub fn next(&self, timeout: Duration) -> Option<UiEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn sender(&self) -> Sender<UiEvent> {
        self.tx.clone()
    }

    /// Broadcaster callback that forwards screens into this dispatcher
    /// without copying them.
    pub fn screen_callback(
        &self,
    ) -> impl Fn(&Arc<BufferSnapshot>) -> Result<(), SubscriberError> + Send + Sync + 'static {
        let tx = self.sender();
        move |snapshot: &Arc<BufferSnapshot>| {
            tx.send(UiEvent::Screen(Arc::clone(snapshot)))
                .map_err(|_| SubscriberError::new("viewer closed"))
        }
    }

    /// Read crossterm key events on a background thread until the returned
    /// reader is dropped.
    pub fn spawn_input_reader(&self) -> std::io::Result<InputReader> {
        let stop = Arc::new(AtomicBool::new(false));
        let tx = self.sender();
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("ptytest-input".to_string())
            .spawn(move || {
                while !thread_stop.load(Ordering::Relaxed) {
                    match event::poll(INPUT_POLL) {
                        Ok(true) => match event::read() {
                            Ok(Event::Key(key)) => {
                                if tx.send(UiEvent::Key(key)).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(err) => {
                                tracing::debug!(error = %err, "input read failed");
                                break;
                            }
                        },
                        Ok(false) => {}
                        Err(err) => {
                            tracing::debug!(error = %err, "input poll failed");
                            break;
                        }
                    }
                }
            })?;
        Ok(InputReader {
            stop,
            handle: Some(handle),
        })
    }
}

/// Stops and joins the input thread on drop.
pub struct InputReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
