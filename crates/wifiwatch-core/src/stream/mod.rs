// ── Cold event streams ──
//
// An `Observable` is a factory: every `subscribe()` repeats the setup
// side effects (listener allocation, host registration) and returns an
// independent `Subscription` that owns its own listener and sink. Nothing
// is shared between subscriptions; callers wanting fan-out layer it on top.

mod disposable;
mod emitter;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::affinity::{AffinityScheduler, Task};
use crate::error::WifiError;

pub use disposable::Disposable;
pub use emitter::Emitter;

type OnSubscribe<T> = dyn Fn(Emitter<T>) -> Option<Task> + Send + Sync;

/// Lazily-started, cold stream of `T`.
///
/// Holds no resources until [`subscribe`](Self::subscribe) is called.
pub struct Observable<T> {
    name: &'static str,
    on_subscribe: Arc<OnSubscribe<T>>,
    default: Option<T>,
    scheduler: Arc<dyn AffinityScheduler>,
}

impl<T: Clone + Send + 'static> Observable<T> {
    /// Build an observable from its per-subscription setup.
    ///
    /// `on_subscribe` receives the new subscription's emitter and returns
    /// the teardown action to attach, or `None` if nothing was acquired.
    pub fn new<F>(name: &'static str, scheduler: Arc<dyn AffinityScheduler>, on_subscribe: F) -> Self
    where
        F: Fn(Emitter<T>) -> Option<Task> + Send + Sync + 'static,
    {
        Self {
            name,
            on_subscribe: Arc::new(on_subscribe),
            default: None,
            scheduler,
        }
    }

    /// Prime every subscription with `value` as its first item.
    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start a new, independent subscription.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let emitter = Emitter::new(tx, cancel.clone());

        // The default goes in before registration so it is always first.
        if let Some(default) = &self.default {
            emitter.emit(default.clone());
        }

        let disposable = match (self.on_subscribe)(emitter) {
            Some(teardown) => Disposable::new(teardown, Arc::clone(&self.scheduler)),
            None => Disposable::empty(Arc::clone(&self.scheduler)),
        };

        debug!(stream = self.name, "subscribed");

        Subscription {
            name: self.name,
            rx: UnboundedReceiverStream::new(rx),
            cancel,
            disposable,
            finished: false,
        }
    }
}

impl<T: Clone> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            on_subscribe: Arc::clone(&self.on_subscribe),
            default: self.default.clone(),
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("name", &self.name)
            .field("primed", &self.default.is_some())
            .finish_non_exhaustive()
    }
}

// ── Subscription ────────────────────────────────────────────────────

/// One live subscription.
///
/// Yields `Ok(value)` per relevant notification, in delivery order. A
/// terminal `Err` ends the stream. Cancelling (or dropping) stops further
/// items immediately; the listener itself is unregistered through the
/// affinity handoff, which may complete later when cancelled off-thread.
pub struct Subscription<T> {
    name: &'static str,
    rx: UnboundedReceiverStream<Result<T, WifiError>>,
    cancel: CancellationToken,
    disposable: Disposable,
    finished: bool,
}

impl<T> Subscription<T> {
    /// Stop the subscription and tear down its listener. Idempotent.
    ///
    /// Off the affinity thread the teardown is only queued. If that
    /// scheduler has already shut down the task is dropped with a warning
    /// and the listener stays registered with the host, so cancel every
    /// subscription before shutting its scheduler down.
    pub fn cancel(&mut self) {
        if !self.cancel.is_cancelled() {
            self.cancel.cancel();
            self.rx.close();
            debug!(stream = self.name, "subscription cancelled");
        }
        self.disposable.dispose();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the teardown action has been run or handed off.
    pub fn is_disposed(&self) -> bool {
        self.disposable.is_disposed()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take the next already-delivered item without waiting.
    pub fn try_next(&mut self) -> Option<Result<T, WifiError>> {
        if self.finished || self.cancel.is_cancelled() {
            return None;
        }
        let item = self.rx.as_mut().try_recv().ok()?;
        if item.is_err() {
            self.finished = true;
        }
        Some(item)
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T, WifiError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished || this.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.rx).poll_next(cx) {
            Poll::Ready(Some(Err(error))) => {
                this.finished = true;
                Poll::Ready(Some(Err(error)))
            }
            other => other,
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
