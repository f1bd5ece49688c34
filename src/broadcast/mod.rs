//! Live screen updates for observers that must not slow the driver down.
//!
//! A [`Broadcaster`] polls a session's shared buffer on its own thread and
//! hands every new screen state to its subscribers. Subscribers never touch
//! the session, so a slow or failing one cannot stall a test.

mod subscriber;

pub use subscriber::{Callback, SubscriptionId};

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use subscriber::{Delivery, Sink, Subscribers};

use crate::config::BroadcastConfig;
use crate::error::{Result, SubscriberError};
use crate::pty::{BufferSnapshot, SharedBuffer};
use crate::session::Session;
use crate::util::join_with_timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Phase {
    NotStarted = 0,
    Running = 1,
    ShutDown = 2,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::NotStarted,
            1 => Phase::Running,
            _ => Phase::ShutDown,
        }
    }
}

/// Polling settings resolved from [`BroadcastConfig`].
#[derive(Debug, Clone, Copy)]
struct Settings {
    poll_interval: Duration,
    join_timeout: Duration,
    notify_on_cursor: bool,
}

impl From<&BroadcastConfig> for Settings {
    fn from(config: &BroadcastConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            join_timeout: Duration::from_millis(config.join_timeout_ms),
            notify_on_cursor: config.notify_on_cursor,
        }
    }
}

struct Shared {
    buffer: SharedBuffer,
    settings: Settings,
    subscribers: Mutex<Subscribers>,
    last: Mutex<Option<Arc<BufferSnapshot>>>,
    phase: AtomicU8,
    stop: Mutex<bool>,
    wake: Condvar,
}

impl Shared {
    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn read(&self) -> BufferSnapshot {
        let buffer = self.buffer.lock();
        BufferSnapshot::capture(&**buffer)
    }

    fn changed(&self, last: &BufferSnapshot, current: &BufferSnapshot) -> bool {
        if self.settings.notify_on_cursor {
            last != current
        } else {
            !last.same_lines(current)
        }
    }

    /// One read/compare/notify pass.
    fn tick(&self) {
        let current = self.read();
        let snapshot = {
            let mut last = self.last.lock();
            if let Some(previous) = last.as_deref() {
                if !self.changed(previous, &current) {
                    return;
                }
            }
            let snapshot = Arc::new(current);
            *last = Some(Arc::clone(&snapshot));
            snapshot
        };

        let subscribers = self.subscribers.lock().copy();
        tracing::trace!(subscribers = subscribers.len(), "broadcasting screen update");

        let mut gone = Vec::new();
        for subscriber in &subscribers {
            if let Delivery::Gone = subscriber.deliver(&snapshot) {
                gone.push(subscriber.id);
            }
        }
        if !gone.is_empty() {
            let mut subscribers = self.subscribers.lock();
            for id in gone {
                tracing::debug!(subscriber = %id, "pruning closed channel subscriber");
                subscribers.remove(id);
            }
        }
    }

    /// Sleep one interval. Returns `true` when asked to stop.
    fn wait(&self) -> bool {
        let mut stop = self.stop.lock();
        if !*stop {
            self.wake.wait_for(&mut stop, self.settings.poll_interval);
        }
        *stop
    }

    fn run(&self) {
        tracing::debug!(interval = ?self.settings.poll_interval, "broadcaster started");
        loop {
            if *self.stop.lock() {
                break;
            }
            self.tick();
            if self.wait() {
                break;
            }
        }
        tracing::debug!("broadcaster stopped");
    }
}

/// Polls a session's screen and fans changes out to subscribers.
///
/// Lifecycle is one-way: not started, running, shut down. A broadcaster
/// that has been shut down cannot be started again. It is independent of
/// the session's lifecycle; once the session is cleaned up the screen
/// simply stops changing.
pub struct Broadcaster {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Broadcaster {
    /// Broadcaster over `session`'s buffer, polling every `poll_interval`.
    pub fn new(session: &Session, poll_interval: Duration) -> Self {
        let config = BroadcastConfig {
            poll_interval_ms: poll_interval.as_millis() as u64,
            ..BroadcastConfig::default()
        };
        Self::from_buffer(session.buffer(), &config)
    }

    pub fn from_buffer(buffer: SharedBuffer, config: &BroadcastConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                buffer,
                settings: Settings::from(config),
                subscribers: Mutex::new(Subscribers::default()),
                last: Mutex::new(None),
                phase: AtomicU8::new(Phase::NotStarted as u8),
                stop: Mutex::new(false),
                wake: Condvar::new(),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Start the polling thread. Does nothing if already running or shut
    /// down.
    pub fn start(&self) -> Result<()> {
        let mut thread = self.thread.lock();
        if self
            .shared
            .phase
            .compare_exchange(
                Phase::NotStarted as u8,
                Phase::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("ptytest-broadcast".to_string())
            .spawn(move || shared.run());
        match spawned {
            Ok(handle) => {
                *thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.shared
                    .phase
                    .store(Phase::NotStarted as u8, Ordering::SeqCst);
                Err(err.into())
            }
        }
    }

    /// Register a callback. It runs on the broadcaster thread.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<BufferSnapshot>) -> std::result::Result<(), SubscriberError>
            + Send
            + Sync
            + 'static,
    {
        let id = self
            .shared
            .subscribers
            .lock()
            .add(Sink::Callback(Arc::new(callback)));
        tracing::debug!(subscriber = %id, "subscribed");
        id
    }

    /// Register a channel. Dropping the receiver unsubscribes on the next
    /// update.
    pub fn subscribe_channel(&self) -> (SubscriptionId, Receiver<Arc<BufferSnapshot>>) {
        let (sender, receiver) = mpsc::channel();
        let id = self.shared.subscribers.lock().add(Sink::Channel(sender));
        tracing::debug!(subscriber = %id, "subscribed channel");
        (id, receiver)
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.shared.subscribers.lock().remove(id) {
            tracing::debug!(subscriber = %id, "unsubscribed");
        }
    }

    /// Stop polling, wait (bounded) for the thread and drop all
    /// subscribers. Idempotent.
    pub fn shutdown(&self) {
        let previous = self.shared.phase.swap(Phase::ShutDown as u8, Ordering::SeqCst);
        {
            let mut stop = self.shared.stop.lock();
            *stop = true;
            self.shared.wake.notify_all();
        }
        if let Some(handle) = self.thread.lock().take() {
            if !join_with_timeout(handle, self.shared.settings.join_timeout) {
                tracing::warn!("broadcaster thread did not stop in time, detaching");
            }
        }
        self.shared.subscribers.lock().clear();
        if Phase::from_u8(previous) != Phase::ShutDown {
            tracing::info!("broadcaster shut down");
        }
    }

    /// Read the screen right now, on the calling thread.
    pub fn get_screen_state(&self) -> BufferSnapshot {
        self.shared.read()
    }

    pub fn is_running(&self) -> bool {
        self.shared.phase() == Phase::Running
            && self
                .thread
                .lock()
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pty::emulator;

    fn buffer() -> SharedBuffer {
        emulator::shared(emulator::create(4, 20))
    }

    fn config(notify_on_cursor: bool) -> BroadcastConfig {
        BroadcastConfig {
            poll_interval_ms: 10,
            join_timeout_ms: 500,
            notify_on_cursor,
        }
    }

    #[test]
    fn first_pass_always_notifies() {
        let broadcaster = Broadcaster::from_buffer(buffer(), &config(true));
        let (_, rx) = broadcaster.subscribe_channel();
        broadcaster.shared.tick();
        assert!(rx.try_recv().is_ok());
        broadcaster.shared.tick();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn cursor_only_change_respects_setting() {
        for (notify_on_cursor, expected) in [(true, true), (false, false)] {
            let buf = buffer();
            let broadcaster =
                Broadcaster::from_buffer(SharedBuffer::clone(&buf), &config(notify_on_cursor));
            let (_, rx) = broadcaster.subscribe_channel();
            buf.lock().feed(b"abc");
            broadcaster.shared.tick();
            rx.try_recv().unwrap();
            buf.lock().feed(b"\x1b[1;1H");
            broadcaster.shared.tick();
            assert_eq!(rx.try_recv().is_ok(), expected);
        }
    }

    #[test]
    fn start_after_shutdown_is_noop() {
        let broadcaster = Broadcaster::from_buffer(buffer(), &config(true));
        broadcaster.start().unwrap();
        assert!(broadcaster.is_running());
        broadcaster.shutdown();
        assert!(!broadcaster.is_running());
        broadcaster.start().unwrap();
        assert!(!broadcaster.is_running());
        broadcaster.shutdown();
    }

    #[test]
    fn pass_shares_one_snapshot() {
        let broadcaster = Broadcaster::from_buffer(buffer(), &config(true));
        let (_, a) = broadcaster.subscribe_channel();
        let (_, b) = broadcaster.subscribe_channel();
        broadcaster.shared.tick();
        let a = a.try_recv().unwrap();
        let b = b.try_recv().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn closed_channels_are_pruned() {
        let broadcaster = Broadcaster::from_buffer(buffer(), &config(true));
        let (_, rx) = broadcaster.subscribe_channel();
        drop(rx);
        assert_eq!(broadcaster.subscriber_count(), 1);
        broadcaster.shared.tick();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
