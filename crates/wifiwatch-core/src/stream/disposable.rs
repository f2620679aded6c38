// ── Exactly-once teardown ──

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::affinity::{AffinityScheduler, Task, dispose_on_affinity};

/// Teardown action attached to a subscription.
///
/// [`dispose`](Self::dispose) runs the action at most once, through the
/// affinity handoff: inline on the affinity thread, queued from anywhere
/// else.
pub struct Disposable {
    action: Mutex<Option<Task>>,
    scheduler: Arc<dyn AffinityScheduler>,
}

impl Disposable {
    pub fn new(action: Task, scheduler: Arc<dyn AffinityScheduler>) -> Self {
        Self {
            action: Mutex::new(Some(action)),
            scheduler,
        }
    }

    /// A disposable with nothing to tear down.
    pub fn empty(scheduler: Arc<dyn AffinityScheduler>) -> Self {
        Self {
            action: Mutex::new(None),
            scheduler,
        }
    }

    /// Run (or queue) the teardown action. Later calls are no-ops.
    pub fn dispose(&self) {
        let action = self
            .action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(action) = action {
            dispose_on_affinity(self.scheduler.as_ref(), action);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::affinity::InlineScheduler;

    use super::*;

    #[test]
    fn action_runs_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let disposable = Disposable::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Arc::new(InlineScheduler),
        );

        assert!(!disposable.is_disposed());
        disposable.dispose();
        disposable.dispose();
        assert!(disposable.is_disposed());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_disposable_is_already_disposed() {
        let disposable = Disposable::empty(Arc::new(InlineScheduler));
        assert!(disposable.is_disposed());
        disposable.dispose();
    }
}
