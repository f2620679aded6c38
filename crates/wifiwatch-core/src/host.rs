// ── Host platform capabilities ──
//
// The adapter never talks to a radio directly. A host supplies two
// capabilities: a notification registry (register / unregister a listener
// for a set of notification kinds) and, when available, a radio handle
// for scans and current readings. Both are trait objects so tests and the
// demo shell can inject a simulated host.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::HostError;
use crate::model::{AccessPoint, ConnectionInfo};

// ── Notifications ───────────────────────────────────────────────────

/// The five notification kinds a host delivers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NotificationKind {
    RadioStateChanged,
    SignalChanged,
    ScanCompleted,
    SupplicantStateChanged,
    SupplicantConnectionChanged,
}

/// A host-delivered signal that some radio condition changed.
///
/// Payload fields are optional because hosts may omit extras; the
/// adapter decides per stream whether a missing field is defaulted or
/// makes the notification malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Radio power state changed; `state` is the platform code.
    RadioStateChanged { state: Option<i32> },
    /// Received signal strength changed.
    SignalChanged { rssi: Option<i32> },
    /// A scan finished and fresh results can be read from the radio.
    ScanCompleted { updated: bool },
    /// Supplicant moved to a new phase; `state` is the opaque phase token.
    SupplicantStateChanged { state: Option<String> },
    /// Connection to the supplicant was established or lost.
    SupplicantConnectionChanged { connected: Option<bool> },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::RadioStateChanged { .. } => NotificationKind::RadioStateChanged,
            Self::SignalChanged { .. } => NotificationKind::SignalChanged,
            Self::ScanCompleted { .. } => NotificationKind::ScanCompleted,
            Self::SupplicantStateChanged { .. } => NotificationKind::SupplicantStateChanged,
            Self::SupplicantConnectionChanged { .. } => {
                NotificationKind::SupplicantConnectionChanged
            }
        }
    }
}

/// Set of notification kinds a listener is interested in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    kinds: Vec<NotificationKind>,
}

impl NotificationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind to the filter. Duplicates are ignored.
    pub fn with(mut self, kind: NotificationKind) -> Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn kinds(&self) -> &[NotificationKind] {
        &self.kinds
    }

    pub fn matches(&self, notification: &Notification) -> bool {
        self.kinds.contains(&notification.kind())
    }
}

// ── Listeners ───────────────────────────────────────────────────────

/// Receives notifications matching the filter it was registered with.
///
/// Called on the host's dispatch thread; implementations must not block.
pub trait Listener: Send + Sync {
    fn on_notification(&self, notification: &Notification);
}

impl<F> Listener for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn on_notification(&self, notification: &Notification) {
        self(notification);
    }
}

/// Handle identifying one registration with a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Host capabilities ───────────────────────────────────────────────

/// Externally-owned execution context that registers listeners and
/// hands out the radio capability.
///
/// The adapter does not synchronize access to it; hosts that can be torn
/// down concurrently report that through [`HostError`].
pub trait HostContext: Send + Sync {
    /// Register `listener` for every notification matching `filter`.
    fn register_listener(
        &self,
        filter: NotificationFilter,
        listener: Arc<dyn Listener>,
    ) -> Result<ListenerId, HostError>;

    /// Remove a registration. Fails with [`HostError::NotRegistered`] if the
    /// handle is unknown, e.g. because the host already dropped it.
    fn unregister_listener(&self, id: ListenerId) -> Result<(), HostError>;

    /// Obtain the radio capability, if the host has one.
    fn radio(&self) -> Option<Arc<dyn Radio>>;
}

/// Reads and scan control for the WiFi radio.
pub trait Radio: Send + Sync {
    /// Ask the radio to start a scan. Returns whether the request was accepted.
    fn trigger_scan(&self) -> bool;

    /// Current RSSI of the associated network, in dBm.
    fn signal_metric(&self) -> i32;

    /// Snapshot of the currently associated network.
    fn connection_info(&self) -> ConnectionInfo;

    /// Results of the most recent scan.
    fn scan_results(&self) -> Vec<AccessPoint>;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn filter_matches_only_added_kinds() {
        let filter = NotificationFilter::new()
            .with(NotificationKind::SignalChanged)
            .with(NotificationKind::ScanCompleted)
            .with(NotificationKind::SignalChanged);

        assert_eq!(filter.kinds().len(), 2);
        assert!(filter.matches(&Notification::SignalChanged { rssi: Some(-60) }));
        assert!(filter.matches(&Notification::ScanCompleted { updated: true }));
        assert!(!filter.matches(&Notification::RadioStateChanged { state: Some(3) }));
    }

    #[test]
    fn closures_are_listeners() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let listener: Arc<dyn Listener> = Arc::new(move |_: &Notification| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listener.on_notification(&Notification::ScanCompleted { updated: false });
        listener.on_notification(&Notification::ScanCompleted { updated: true });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn kinds_display_in_kebab_case() {
        assert_eq!(
            NotificationKind::SupplicantStateChanged.to_string(),
            "supplicant-state-changed"
        );
        assert_eq!(
            Notification::SignalChanged { rssi: None }.kind().to_string(),
            "signal-changed"
        );
    }
}
