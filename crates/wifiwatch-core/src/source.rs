//! Event source adapter: host notifications in, typed streams out.
//!
//! Every `observe_*` method returns a cold [`Observable`]. Each
//! subscription allocates its own listener bound to its own emitter,
//! registers it with the host for the relevant notification kinds, and
//! attaches a teardown action that unregisters it through the affinity
//! handoff. Decoding happens synchronously on the host's dispatch thread.
//!
//! | Stream | Notifications | First item | Emits |
//! |--------|---------------|------------|-------|
//! | [`observe_access_points`](ReactiveWifi::observe_access_points) | signal changed, scan completed | none | full scan list, re-scanning each time |
//! | [`observe_signal_level`](ReactiveWifi::observe_signal_level) | signal changed | `NoSignal` | classified level |
//! | [`observe_supplicant_state`](ReactiveWifi::observe_supplicant_state) | supplicant state changed | `Uninitialized` | valid phases only |
//! | [`observe_connection_info`](ReactiveWifi::observe_connection_info) | supplicant state changed | none | snapshot on `Completed` only |
//! | [`observe_connection_state`](ReactiveWifi::observe_connection_state) | radio state changed | none | mapped state, `Unknown` fallback |
//! | [`observe_wifi_on_off`](ReactiveWifi::observe_wifi_on_off) | supplicant connection changed | none | connected flag |

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::affinity::{AffinityScheduler, Task};
use crate::error::WifiError;
use crate::host::{
    HostContext, Listener, ListenerId, Notification, NotificationFilter, NotificationKind, Radio,
};
use crate::model::{
    AccessPoint, ConnectionInfo, ConnectionState, SignalLevel, SupplicantState, classify,
};
use crate::stream::{Emitter, Observable};

const ACCESS_POINTS: &str = "access_points";
const SIGNAL_LEVEL: &str = "signal_level";
const SUPPLICANT_STATE: &str = "supplicant_state";
const CONNECTION_INFO: &str = "connection_info";
const CONNECTION_STATE: &str = "connection_state";
const WIFI_ON_OFF: &str = "wifi_on_off";

/// Factory for the WiFi event streams of one host.
///
/// Cheap to clone; clones share the host and scheduler but every
/// subscription still registers its own listener.
#[derive(Clone)]
pub struct ReactiveWifi {
    host: Arc<dyn HostContext>,
    scheduler: Arc<dyn AffinityScheduler>,
}

impl ReactiveWifi {
    pub fn new(host: Arc<dyn HostContext>, scheduler: Arc<dyn AffinityScheduler>) -> Self {
        Self { host, scheduler }
    }

    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    pub fn scheduler(&self) -> &Arc<dyn AffinityScheduler> {
        &self.scheduler
    }

    // ── Streams ──────────────────────────────────────────────────

    /// Scan results, as a whole list per "signal changed" or "scan
    /// completed" notification.
    ///
    /// Subscribing requests a scan immediately, and every notification
    /// requests another one so results stay fresh. Fails with
    /// [`WifiError::CapabilityUnavailable`] as its only item if the host
    /// has no radio. Identical consecutive lists are not deduplicated.
    pub fn observe_access_points(&self) -> Observable<Vec<AccessPoint>> {
        let host = Arc::clone(&self.host);

        Observable::new(ACCESS_POINTS, Arc::clone(&self.scheduler), move |emitter| {
            let Some(radio) = host.radio() else {
                warn!(stream = ACCESS_POINTS, "no WiFi radio, scan was not started");
                emitter.fail(WifiError::CapabilityUnavailable {
                    reason: "host has no WiFi radio, so scan results cannot be observed".into(),
                });
                return None;
            };

            // Without an initial scan there may never be any results.
            if !radio.trigger_scan() {
                debug!(stream = ACCESS_POINTS, "initial scan request was rejected");
            }

            let filter = NotificationFilter::new()
                .with(NotificationKind::SignalChanged)
                .with(NotificationKind::ScanCompleted);

            let listener: Arc<dyn Listener> = Arc::new(move |_: &Notification| {
                if emitter.is_closed() {
                    return;
                }
                radio.trigger_scan();
                emitter.emit(radio.scan_results());
            });

            register(&host, ACCESS_POINTS, filter, listener)
        })
    }

    /// Named signal level on the default five-band scale, primed with
    /// [`SignalLevel::NoSignal`].
    pub fn observe_signal_level(&self) -> Observable<SignalLevel> {
        self.listen(
            SIGNAL_LEVEL,
            NotificationFilter::new().with(NotificationKind::SignalChanged),
            |notification, emitter, radio| match read_rssi(notification, radio) {
                Ok(rssi) => {
                    emitter.emit(SignalLevel::from_level(classify(rssi, SignalLevel::COUNT)));
                }
                Err(e) => drop_malformed(SIGNAL_LEVEL, &e),
            },
        )
        .with_default(SignalLevel::NoSignal)
    }

    /// Raw signal level in `[0, levels - 1]`, primed with `0`.
    pub fn observe_signal_level_with(&self, levels: u32) -> Observable<u32> {
        self.listen(
            SIGNAL_LEVEL,
            NotificationFilter::new().with(NotificationKind::SignalChanged),
            move |notification, emitter, radio| match read_rssi(notification, radio) {
                Ok(rssi) => {
                    emitter.emit(classify(rssi, levels));
                }
                Err(e) => drop_malformed(SIGNAL_LEVEL, &e),
            },
        )
        .with_default(0)
    }

    /// Supplicant phase, primed with [`SupplicantState::Uninitialized`].
    /// Unrecognized or placeholder phases are dropped.
    pub fn observe_supplicant_state(&self) -> Observable<SupplicantState> {
        self.listen(
            SUPPLICANT_STATE,
            NotificationFilter::new().with(NotificationKind::SupplicantStateChanged),
            |notification, emitter, _radio| match decode_supplicant_state(notification) {
                Ok(state) => {
                    emitter.emit(state);
                }
                Err(e) => drop_malformed(SUPPLICANT_STATE, &e),
            },
        )
        .with_default(SupplicantState::Uninitialized)
    }

    /// Connection snapshot, emitted only when the supplicant reaches
    /// [`SupplicantState::Completed`]. Every other phase is filtered out.
    pub fn observe_connection_info(&self) -> Observable<ConnectionInfo> {
        self.listen(
            CONNECTION_INFO,
            NotificationFilter::new().with(NotificationKind::SupplicantStateChanged),
            |notification, emitter, radio| match decode_supplicant_state(notification) {
                Ok(SupplicantState::Completed) => {
                    if let Some(radio) = radio {
                        emitter.emit(radio.connection_info());
                    } else {
                        trace!(stream = CONNECTION_INFO, "no radio to read connection from");
                    }
                }
                Ok(_) => {}
                Err(e) => drop_malformed(CONNECTION_INFO, &e),
            },
        )
    }

    /// Radio power state. Unmapped or missing codes become
    /// [`ConnectionState::Unknown`].
    pub fn observe_connection_state(&self) -> Observable<ConnectionState> {
        self.listen(
            CONNECTION_STATE,
            NotificationFilter::new().with(NotificationKind::RadioStateChanged),
            |notification, emitter, _radio| match notification {
                Notification::RadioStateChanged { state } => {
                    let code = state.unwrap_or(ConnectionState::UNKNOWN_CODE);
                    emitter.emit(ConnectionState::from_code(code));
                }
                other => drop_malformed(
                    CONNECTION_STATE,
                    &WifiError::malformed(other.kind(), "not a radio state notification"),
                ),
            },
        )
    }

    /// Supplicant connectivity flag.
    pub fn observe_wifi_on_off(&self) -> Observable<bool> {
        self.listen(
            WIFI_ON_OFF,
            NotificationFilter::new().with(NotificationKind::SupplicantConnectionChanged),
            |notification, emitter, _radio| match notification {
                Notification::SupplicantConnectionChanged {
                    connected: Some(connected),
                } => {
                    emitter.emit(*connected);
                }
                other => drop_malformed(
                    WIFI_ON_OFF,
                    &WifiError::malformed(other.kind(), "missing connected flag"),
                ),
            },
        )
    }

    // ── Shared listener lifecycle ────────────────────────────────

    /// Observable whose subscriptions register one listener for `filter`
    /// and decode each notification with `on_notification`.
    ///
    /// The radio is acquired per subscription; streams that merely read
    /// from it degrade quietly when it is missing.
    fn listen<T, F>(
        &self,
        name: &'static str,
        filter: NotificationFilter,
        on_notification: F,
    ) -> Observable<T>
    where
        T: Clone + Send + 'static,
        F: Fn(&Notification, &Emitter<T>, Option<&Arc<dyn Radio>>) + Send + Sync + 'static,
    {
        let host = Arc::clone(&self.host);
        let on_notification = Arc::new(on_notification);

        Observable::new(name, Arc::clone(&self.scheduler), move |emitter| {
            let radio = host.radio();
            let on_notification = Arc::clone(&on_notification);
            let listener: Arc<dyn Listener> = Arc::new(move |notification: &Notification| {
                if !emitter.is_closed() {
                    (*on_notification)(notification, &emitter, radio.as_ref());
                }
            });
            register(&host, name, filter.clone(), listener)
        })
    }
}

/// Register `listener` and build the matching teardown action.
fn register(
    host: &Arc<dyn HostContext>,
    name: &'static str,
    filter: NotificationFilter,
    listener: Arc<dyn Listener>,
) -> Option<Task> {
    match host.register_listener(filter, listener) {
        Ok(id) => {
            debug!(stream = name, listener = %id, "listener registered");
            let host = Arc::clone(host);
            Some(Box::new(move || try_unregister(host.as_ref(), id, name)))
        }
        Err(e) => {
            warn!(stream = name, error = %e, "could not register listener");
            None
        }
    }
}

/// Unregister, absorbing failures: the host may already have dropped the
/// listener, e.g. because its context was torn down first.
fn try_unregister(host: &dyn HostContext, id: ListenerId, name: &'static str) {
    match host.unregister_listener(id) {
        Ok(()) => debug!(stream = name, listener = %id, "listener unregistered"),
        Err(source) => {
            let error = WifiError::TeardownFailure { listener: id, source };
            warn!(stream = name, error = %error, "listener was already unregistered");
        }
    }
}

fn drop_malformed(name: &'static str, error: &WifiError) {
    trace!(stream = name, error = %error, "dropping notification");
}

/// Current RSSI: read from the radio, falling back to the notification
/// payload when the host has no radio.
fn read_rssi(
    notification: &Notification,
    radio: Option<&Arc<dyn Radio>>,
) -> Result<i32, WifiError> {
    match (radio, notification) {
        (Some(radio), _) => Ok(radio.signal_metric()),
        (None, Notification::SignalChanged { rssi: Some(rssi) }) => Ok(*rssi),
        (None, other) => Err(WifiError::malformed(
            other.kind(),
            "no radio and no rssi in payload",
        )),
    }
}

fn decode_supplicant_state(notification: &Notification) -> Result<SupplicantState, WifiError> {
    let kind = notification.kind();
    let Notification::SupplicantStateChanged { state } = notification else {
        return Err(WifiError::malformed(kind, "not a supplicant state notification"));
    };
    let Some(token) = state else {
        return Err(WifiError::malformed(kind, "missing state"));
    };
    let state = SupplicantState::from_token(token)
        .ok_or_else(|| WifiError::malformed(kind, format!("unknown state token {token:?}")))?;
    if state.is_valid() {
        Ok(state)
    } else {
        Err(WifiError::malformed(kind, format!("placeholder state {state}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplicant(token: Option<&str>) -> Notification {
        Notification::SupplicantStateChanged {
            state: token.map(str::to_owned),
        }
    }

    #[test]
    fn decodes_known_supplicant_tokens() {
        assert_eq!(
            decode_supplicant_state(&supplicant(Some("SCANNING"))),
            Ok(SupplicantState::Scanning)
        );
    }

    #[test]
    fn rejects_missing_unknown_and_placeholder_tokens() {
        for token in [None, Some("ROAMING"), Some("UNINITIALIZED"), Some("INVALID")] {
            assert!(matches!(
                decode_supplicant_state(&supplicant(token)),
                Err(WifiError::MalformedNotification {
                    kind: NotificationKind::SupplicantStateChanged,
                    ..
                })
            ));
        }
    }

    #[test]
    fn rssi_falls_back_to_payload_without_radio() {
        let with_rssi = Notification::SignalChanged { rssi: Some(-70) };
        assert_eq!(read_rssi(&with_rssi, None), Ok(-70));

        let without_rssi = Notification::SignalChanged { rssi: None };
        assert!(read_rssi(&without_rssi, None).is_err());
    }
}
