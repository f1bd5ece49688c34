mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::bare_buffer;
use ptytest::config::BroadcastConfig;
use ptytest::{Broadcaster, BufferSnapshot, SubscriberError};

fn config(interval_ms: u64) -> BroadcastConfig {
    BroadcastConfig {
        poll_interval_ms: interval_ms,
        join_timeout_ms: 1_000,
        notify_on_cursor: true,
    }
}

fn counter() -> (
    Arc<AtomicUsize>,
    impl Fn(&Arc<BufferSnapshot>) -> Result<(), SubscriberError>,
) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    (count, move |_: &Arc<BufferSnapshot>| {
        inner.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn distinct_states_yield_bounded_notifications() {
    let buffer = bare_buffer(4, 20);
    let broadcaster = Broadcaster::from_buffer(buffer.clone(), &config(50));
    broadcaster.start().unwrap();
    thread::sleep(Duration::from_millis(120));

    let (count, callback) = counter();
    broadcaster.subscribe(callback);
    for state in ["one", "two", "three"] {
        buffer.lock().feed(format!("\x1b[H{state:<5}").as_bytes());
        thread::sleep(Duration::from_millis(100));
    }
    thread::sleep(Duration::from_millis(100));
    broadcaster.shutdown();

    let calls = count.load(Ordering::SeqCst);
    assert!((1..=3).contains(&calls), "got {calls} notifications");
}

#[test]
fn unsubscribe_stops_notifications() {
    let buffer = bare_buffer(4, 20);
    let broadcaster = Broadcaster::from_buffer(buffer.clone(), &config(10));
    let (count, callback) = counter();
    let id = broadcaster.subscribe(callback);
    broadcaster.start().unwrap();

    buffer.lock().feed(b"first");
    thread::sleep(Duration::from_millis(60));
    broadcaster.unsubscribe(id);
    let seen = count.load(Ordering::SeqCst);
    assert!(seen >= 1);

    buffer.lock().feed(b" second");
    thread::sleep(Duration::from_millis(60));
    assert_eq!(count.load(Ordering::SeqCst), seen);
    assert_eq!(broadcaster.subscriber_count(), 0);
}

#[test]
fn failing_subscribers_do_not_block_others() {
    let buffer = bare_buffer(4, 20);
    let broadcaster = Broadcaster::from_buffer(buffer.clone(), &config(10));
    broadcaster.subscribe(|_| Err(SubscriberError::new("always fails")));
    broadcaster.subscribe(|_| panic!("subscriber bug"));
    let (count, callback) = counter();
    broadcaster.subscribe(callback);
    broadcaster.start().unwrap();

    // The first pass always notifies; wait for it before counting.
    let mut waited = 0;
    while count.load(Ordering::SeqCst) == 0 && waited < 100 {
        thread::sleep(Duration::from_millis(10));
        waited += 1;
    }
    thread::sleep(Duration::from_millis(60));
    let baseline = count.load(Ordering::SeqCst);
    assert_eq!(baseline, 1);

    const CHANGES: usize = 5;
    for i in 0..CHANGES {
        buffer.lock().feed(format!("\x1b[Hstate {i}").as_bytes());
        thread::sleep(Duration::from_millis(80));
    }
    assert!(broadcaster.is_running());
    broadcaster.shutdown();
    assert_eq!(count.load(Ordering::SeqCst) - baseline, CHANGES);
}

#[test]
fn concurrent_subscribe_and_reads() {
    let buffer = bare_buffer(4, 40);
    let broadcaster = Arc::new(Broadcaster::from_buffer(buffer.clone(), &config(5)));
    broadcaster.start().unwrap();

    let writer = {
        let buffer = buffer.clone();
        thread::spawn(move || {
            for i in 0..100 {
                let row = if i % 2 == 0 { "x".repeat(30) } else { "y".repeat(30) };
                buffer.lock().feed(format!("\x1b[H{row}").as_bytes());
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let broadcaster = Arc::clone(&broadcaster);
            thread::spawn(move || {
                for _ in 0..25 {
                    let id = broadcaster.subscribe(|_| Ok(()));
                    let state = broadcaster.get_screen_state();
                    let first = state.lines.first().cloned().unwrap_or_default();
                    assert!(
                        first.is_empty()
                            || first.chars().all(|c| c == 'x')
                            || first.chars().all(|c| c == 'y'),
                        "torn line: {first}"
                    );
                    broadcaster.unsubscribe(id);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
    writer.join().unwrap();
    assert_eq!(broadcaster.subscriber_count(), 0);
    broadcaster.shutdown();
}

#[test]
fn channel_subscribers_receive_snapshots() {
    let buffer = bare_buffer(4, 20);
    let broadcaster = Broadcaster::from_buffer(buffer.clone(), &config(10));
    let (_, rx) = broadcaster.subscribe_channel();
    broadcaster.start().unwrap();
    buffer.lock().feed(b"via channel");

    let found = (0..50).any(|_| {
        rx.recv_timeout(Duration::from_millis(100))
            .is_ok_and(|snapshot| snapshot.contains("via channel"))
    });
    assert!(found);
    broadcaster.shutdown();
}

#[test]
fn shutdown_is_idempotent_and_final() {
    let broadcaster = Broadcaster::from_buffer(bare_buffer(2, 10), &config(10));
    broadcaster.shutdown();
    broadcaster.shutdown();
    broadcaster.start().unwrap();
    assert!(!broadcaster.is_running());
}

#[test]
fn screen_state_without_start() {
    let buffer = bare_buffer(2, 10);
    buffer.lock().feed(b"direct");
    let broadcaster = Broadcaster::from_buffer(buffer, &config(10));
    assert_eq!(broadcaster.get_screen_state().lines[0], "direct");
}

#[test]
fn unbounded_join_timeout_shuts_down() {
    let broadcaster = Broadcaster::from_buffer(
        bare_buffer(2, 10),
        &BroadcastConfig {
            join_timeout_ms: u64::MAX,
            ..config(10)
        },
    );
    broadcaster.start().unwrap();
    broadcaster.shutdown();
    assert!(!broadcaster.is_running());
}
