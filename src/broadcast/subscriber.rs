use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::error::SubscriberError;
use crate::pty::BufferSnapshot;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Callback invoked on the broadcaster thread with every new screen state.
///
/// All subscribers of one pass receive the same `Arc`.
pub type Callback =
    Arc<dyn Fn(&Arc<BufferSnapshot>) -> Result<(), SubscriberError> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Sink {
    Callback(Callback),
    Channel(Sender<Arc<BufferSnapshot>>),
}

pub(crate) enum Delivery {
    Delivered,
    Failed,
    /// Receiver dropped; the subscription can be pruned.
    Gone,
}

#[derive(Clone)]
pub(crate) struct Subscriber {
    pub(crate) id: SubscriptionId,
    sink: Sink,
    active: Arc<AtomicBool>,
}

impl Subscriber {
    /// Hand `snapshot` to the sink. Errors and panics stay inside.
    pub(crate) fn deliver(&self, snapshot: &Arc<BufferSnapshot>) -> Delivery {
        if !self.active.load(Ordering::SeqCst) {
            return Delivery::Delivered;
        }
        match &self.sink {
            Sink::Callback(callback) => {
                match panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                    Ok(Ok(())) => Delivery::Delivered,
                    Ok(Err(err)) => {
                        tracing::debug!(subscriber = %self.id, error = %err, "subscriber failed");
                        Delivery::Failed
                    }
                    Err(_) => {
                        tracing::debug!(subscriber = %self.id, "subscriber panicked");
                        Delivery::Failed
                    }
                }
            }
            Sink::Channel(sender) => match sender.send(Arc::clone(snapshot)) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Gone,
            },
        }
    }
}

/// Ordered subscriber collection. Guarded by its own lock, which is never
/// held while a sink runs.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<Subscriber>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, sink: Sink) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push(Subscriber {
            id,
            sink,
            active: Arc::new(AtomicBool::new(true)),
        });
        id
    }

    /// Remove `id`. Copies taken before this call will skip it.
    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                let entry = self.entries.remove(index);
                entry.active.store(false, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub(crate) fn copy(&self) -> Vec<Subscriber> {
        self.entries.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.active.store(false, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn counting(counter: &Arc<AtomicUsize>) -> Sink {
        let counter = Arc::clone(counter);
        Sink::Callback(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut subs = Subscribers::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let a = subs.add(counting(&counter));
        let b = subs.add(counting(&counter));
        assert!(a < b);
        assert_eq!(subs.len(), 2);
        assert!(subs.remove(a));
        assert!(!subs.remove(a));
        assert_eq!(subs.copy()[0].id, b);
    }

    #[test]
    fn removed_copy_is_skipped() {
        let mut subs = Subscribers::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = subs.add(counting(&counter));
        let copied = subs.copy();
        subs.remove(id);
        copied[0].deliver(&Arc::new(BufferSnapshot::default()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_callback_is_contained() {
        let mut subs = Subscribers::default();
        subs.add(Sink::Callback(Arc::new(|_| panic!("boom"))));
        let result = subs.copy()[0].deliver(&Arc::new(BufferSnapshot::default()));
        assert!(matches!(result, Delivery::Failed));
    }

    #[test]
    fn dropped_receiver_reports_gone() {
        let mut subs = Subscribers::default();
        let (tx, rx) = mpsc::channel();
        subs.add(Sink::Channel(tx));
        drop(rx);
        let result = subs.copy()[0].deliver(&Arc::new(BufferSnapshot::default()));
        assert!(matches!(result, Delivery::Gone));
    }
}
