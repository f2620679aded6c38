// ── Emission sink ──

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::WifiError;

/// Sink bound to exactly one subscription.
///
/// Cloned into the subscription's listener. Emissions are dropped once the
/// subscription is cancelled or after a terminal error, even if the
/// listener is still registered with the host (teardown may be deferred).
pub struct Emitter<T> {
    tx: mpsc::UnboundedSender<Result<T, WifiError>>,
    cancel: CancellationToken,
    terminated: Arc<AtomicBool>,
}

impl<T> Emitter<T> {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<Result<T, WifiError>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tx,
            cancel,
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deliver a value. Returns `false` if the value was dropped.
    pub fn emit(&self, value: T) -> bool {
        if self.is_closed() {
            return false;
        }
        self.tx.send(Ok(value)).is_ok()
    }

    /// Deliver a terminal error. No further values are delivered afterwards.
    pub fn fail(&self, error: WifiError) {
        if self.terminated.swap(true, Ordering::SeqCst) || self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(Err(error));
    }

    /// Whether the subscription was cancelled or terminated.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.terminated.load(Ordering::SeqCst)
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            cancel: self.cancel.clone(),
            terminated: Arc::clone(&self.terminated),
        }
    }
}
