// ── Core error types ──
//
// Only `CapabilityUnavailable` ever reaches a consumer, as the terminal
// item of an access-point stream. Malformed notifications and teardown
// failures are absorbed where they happen and reported through `tracing`.

use thiserror::Error;

use crate::host::{ListenerId, NotificationKind};

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WifiError {
    // ── Subscription errors ──────────────────────────────────────────
    #[error("WiFi radio capability unavailable: {reason}")]
    CapabilityUnavailable { reason: String },

    // ── Per-notification errors (absorbed) ───────────────────────────
    #[error("Malformed {kind} notification: {reason}")]
    MalformedNotification {
        kind: NotificationKind,
        reason: String,
    },

    // ── Teardown errors (absorbed) ───────────────────────────────────
    #[error("Could not unregister listener {listener}: {source}")]
    TeardownFailure {
        listener: ListenerId,
        #[source]
        source: HostError,
    },

    // ── Scheduler errors ─────────────────────────────────────────────
    #[error("Affinity thread unavailable: {reason}")]
    AffinityUnavailable { reason: String },
}

impl WifiError {
    pub(crate) fn malformed(kind: NotificationKind, reason: impl Into<String>) -> Self {
        Self::MalformedNotification {
            kind,
            reason: reason.into(),
        }
    }
}

/// Failures reported by a [`HostContext`](crate::host::HostContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("listener {0} is not registered")]
    NotRegistered(ListenerId),

    #[error("host context has been torn down")]
    ContextRevoked,
}
