// ── Simulated host ──
//
// In-process `HostContext` used by the replay shell and the test suite.
// Notifications are pushed in with `deliver`, which calls every matching
// listener synchronously on the calling thread, the way a platform's
// broadcast dispatcher would.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::error::HostError;
use crate::host::{HostContext, Listener, ListenerId, Notification, NotificationFilter, Radio};
use crate::location::{LocationProvider, LocationService};
use crate::model::{AccessPoint, ConnectionInfo, INVALID_RSSI};

struct Registration {
    filter: NotificationFilter,
    listener: Arc<dyn Listener>,
}

/// Host that keeps its listener registry in memory.
///
/// Counts registrations and unregistrations and records which thread each
/// unregistration ran on, so callers can check teardown behavior.
pub struct SimulatedHost {
    listeners: DashMap<ListenerId, Registration>,
    next_id: AtomicU64,
    radio: Option<Arc<SimulatedRadio>>,
    revoked: AtomicBool,
    registrations: AtomicUsize,
    unregistrations: AtomicUsize,
    failed_unregistrations: AtomicUsize,
    unregister_threads: Mutex<Vec<ThreadId>>,
    gps_enabled: AtomicBool,
    network_location_enabled: AtomicBool,
}

impl SimulatedHost {
    /// Host with a radio and location enabled.
    pub fn new() -> Self {
        Self::build(Some(Arc::new(SimulatedRadio::new())))
    }

    /// Host without any WiFi radio capability.
    pub fn without_radio() -> Self {
        Self::build(None)
    }

    fn build(radio: Option<Arc<SimulatedRadio>>) -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
            radio,
            revoked: AtomicBool::new(false),
            registrations: AtomicUsize::new(0),
            unregistrations: AtomicUsize::new(0),
            failed_unregistrations: AtomicUsize::new(0),
            unregister_threads: Mutex::new(Vec::new()),
            gps_enabled: AtomicBool::new(true),
            network_location_enabled: AtomicBool::new(true),
        }
    }

    /// The concrete radio, for adjusting readings between notifications.
    pub fn radio_handle(&self) -> Option<&Arc<SimulatedRadio>> {
        self.radio.as_ref()
    }

    /// Dispatch `notification` to every matching listener on the calling
    /// thread. Returns how many listeners were called.
    pub fn deliver(&self, notification: &Notification) -> usize {
        // Snapshot first so listeners may (un)register without deadlocking.
        let targets: Vec<Arc<dyn Listener>> = self
            .listeners
            .iter()
            .filter(|entry| entry.value().filter.matches(notification))
            .map(|entry| Arc::clone(&entry.value().listener))
            .collect();

        trace!(kind = %notification.kind(), listeners = targets.len(), "delivering notification");
        for listener in &targets {
            listener.on_notification(notification);
        }
        targets.len()
    }

    /// Tear the context down: every registration is dropped and further
    /// registrations fail.
    pub fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
        self.listeners.clear();
        debug!("simulated host revoked");
    }

    pub fn set_location(&self, gps: bool, network: bool) {
        self.gps_enabled.store(gps, Ordering::SeqCst);
        self.network_location_enabled.store(network, Ordering::SeqCst);
    }

    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    /// Successful unregistrations.
    pub fn unregistrations(&self) -> usize {
        self.unregistrations.load(Ordering::SeqCst)
    }

    /// Unregistrations rejected because the handle was unknown.
    pub fn failed_unregistrations(&self) -> usize {
        self.failed_unregistrations.load(Ordering::SeqCst)
    }

    /// Threads that called `unregister_listener`, in call order.
    pub fn unregister_threads(&self) -> Vec<ThreadId> {
        self.unregister_threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostContext for SimulatedHost {
    fn register_listener(
        &self,
        filter: NotificationFilter,
        listener: Arc<dyn Listener>,
    ) -> Result<ListenerId, HostError> {
        if self.revoked.load(Ordering::SeqCst) {
            return Err(HostError::ContextRevoked);
        }
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners.insert(id, Registration { filter, listener });
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn unregister_listener(&self, id: ListenerId) -> Result<(), HostError> {
        self.unregister_threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(thread::current().id());

        if self.listeners.remove(&id).is_some() {
            self.unregistrations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        } else {
            self.failed_unregistrations.fetch_add(1, Ordering::SeqCst);
            Err(HostError::NotRegistered(id))
        }
    }

    fn radio(&self) -> Option<Arc<dyn Radio>> {
        let radio: Arc<dyn Radio> = self.radio.clone()?;
        Some(radio)
    }
}

impl LocationService for SimulatedHost {
    fn is_provider_enabled(&self, provider: LocationProvider) -> bool {
        match provider {
            LocationProvider::Gps => self.gps_enabled.load(Ordering::SeqCst),
            LocationProvider::Network => self.network_location_enabled.load(Ordering::SeqCst),
        }
    }
}

// ── SimulatedRadio ──────────────────────────────────────────────────

/// Radio whose readings are set by the caller.
pub struct SimulatedRadio {
    rssi: AtomicI32,
    scan_results: ArcSwap<Vec<AccessPoint>>,
    connection: ArcSwap<ConnectionInfo>,
    scans: AtomicUsize,
}

impl SimulatedRadio {
    pub fn new() -> Self {
        Self {
            rssi: AtomicI32::new(INVALID_RSSI),
            scan_results: ArcSwap::from_pointee(Vec::new()),
            connection: ArcSwap::from_pointee(ConnectionInfo::default()),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn set_rssi(&self, rssi: i32) {
        self.rssi.store(rssi, Ordering::SeqCst);
    }

    pub fn set_scan_results(&self, results: Vec<AccessPoint>) {
        self.scan_results.store(Arc::new(results));
    }

    pub fn set_connection_info(&self, info: ConnectionInfo) {
        self.connection.store(Arc::new(info));
    }

    /// Number of scan requests received so far.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Radio for SimulatedRadio {
    fn trigger_scan(&self) -> bool {
        self.scans.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn signal_metric(&self) -> i32 {
        self.rssi.load(Ordering::SeqCst)
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::clone(&self.connection.load())
    }

    fn scan_results(&self) -> Vec<AccessPoint> {
        Vec::clone(&self.scan_results.load())
    }
}
