//! Thread-affinity scheduling for listener teardown.
//!
//! Hosts require listener unregistration to happen on one designated
//! thread. An [`AffinityScheduler`] answers "am I on that thread?" and
//! queues one-shot tasks onto it. [`dispose_on_affinity`] applies the
//! handoff rule: run inline when already on the affinity thread, otherwise
//! enqueue and return without waiting.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::WifiError;

/// A one-shot unit of work executed on the affinity thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Single-thread task queue the adapter hands teardown actions to.
pub trait AffinityScheduler: Send + Sync {
    /// Whether the calling thread is the affinity thread.
    fn is_affinity_thread(&self) -> bool;

    /// Queue `task` for execution on the affinity thread. Must not block.
    fn schedule(&self, task: Task);
}

/// Run `action` on the affinity thread.
///
/// Inline when the caller is already there; otherwise the action is queued
/// and this returns immediately, before the action has run.
pub fn dispose_on_affinity(scheduler: &dyn AffinityScheduler, action: Task) {
    if scheduler.is_affinity_thread() {
        action();
    } else {
        scheduler.schedule(action);
    }
}

// ── AffinityThread ──────────────────────────────────────────────────

/// A dedicated, named OS thread draining a FIFO queue of tasks.
///
/// Stands in for a GUI host's main thread. Tasks run in the order they
/// were scheduled. Dropping the handle shuts the thread down after the
/// queue drains.
pub struct AffinityThread {
    thread_id: ThreadId,
    name: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Task>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl AffinityThread {
    /// Spawn the thread.
    pub fn spawn(name: impl Into<String>) -> Result<Arc<Self>, WifiError> {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    task();
                }
            })
            .map_err(|e| WifiError::AffinityUnavailable {
                reason: e.to_string(),
            })?;

        debug!(thread = %name, "affinity thread started");

        Ok(Arc::new(Self {
            thread_id: handle.thread().id(),
            name,
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Close the queue, let pending tasks finish, and join the thread.
    ///
    /// Idempotent. Called from the affinity thread itself it only closes
    /// the queue, since joining would deadlock. Tasks scheduled afterwards
    /// are dropped, including teardowns of still-live subscriptions.
    pub fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);

        if self.is_affinity_thread() {
            return;
        }

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(thread = %self.name, "affinity thread panicked");
            } else {
                debug!(thread = %self.name, "affinity thread stopped");
            }
        }
    }
}

impl AffinityScheduler for AffinityThread {
    fn is_affinity_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    fn schedule(&self, task: Task) {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let delivered = guard.as_ref().is_some_and(|tx| tx.send(task).is_ok());
        if !delivered {
            warn!(thread = %self.name, "affinity thread is shut down; dropping task");
        }
    }
}

impl Drop for AffinityThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── InlineScheduler ─────────────────────────────────────────────────

/// Scheduler for hosts without thread affinity: every thread counts as
/// the affinity thread, so teardown always runs inline.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl AffinityScheduler for InlineScheduler {
    fn is_affinity_thread(&self) -> bool {
        true
    }

    fn schedule(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn tasks_run_on_the_named_thread_in_order() {
        let affinity = AffinityThread::spawn("test-affinity").unwrap();
        let (tx, rx) = oneshot::channel();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = Arc::clone(&order);
            affinity.schedule(Box::new(move || order.lock().unwrap().push(i)));
        }
        affinity.schedule(Box::new(move || {
            let name = thread::current().name().map(str::to_owned);
            let _ = tx.send(name);
        }));

        assert_eq!(rx.blocking_recv().unwrap().as_deref(), Some("test-affinity"));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn caller_thread_is_not_the_affinity_thread() {
        let affinity = AffinityThread::spawn("test-affinity").unwrap();
        assert!(!affinity.is_affinity_thread());

        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&affinity);
        affinity.schedule(Box::new(move || {
            let _ = tx.send(inner.is_affinity_thread());
        }));
        assert!(rx.blocking_recv().unwrap());
    }

    #[test]
    fn dispose_runs_inline_on_affinity_thread() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        dispose_on_affinity(
            &InlineScheduler,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shutdown_drains_pending_tasks_and_drops_later_ones() {
        let affinity = AffinityThread::spawn("test-affinity").unwrap();
        let ran = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&ran);
            affinity.schedule(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        affinity.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 5);

        let counter = Arc::clone(&ran);
        affinity.schedule(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        affinity.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 5);
    }
}
