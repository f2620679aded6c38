//! WiFi state as observable event streams.
//!
//! This crate turns a host's push-style broadcast notifications into typed,
//! cold, cancellable streams:
//!
//! - **[`ReactiveWifi`]**: the event source adapter. Its `observe_*`
//!   methods return one [`Observable`] per kind of WiFi state (scan
//!   results, signal level, supplicant phase, connection snapshot, radio
//!   state, supplicant connectivity).
//!
//! - **[`Observable`] / [`Subscription`]**: lazy stream factory and live
//!   subscription handle. Every subscription registers its own listener
//!   with the host and unregisters it on cancel or drop, through the
//!   affinity handoff in [`affinity`].
//!
//! - **Host seam** ([`host`]): [`HostContext`] and [`Radio`] traits the
//!   platform implements. [`SimulatedHost`] is an in-memory host for tests
//!   and replays.
//!
//! - **Domain model** ([`model`]): [`SignalLevel`] classification,
//!   [`SupplicantState`] and [`ConnectionState`] tables, scan records.
//!
//! - **Location helpers** ([`location`]): provider checks and the
//!   confirmation prompt shown before scanning.

pub mod affinity;
pub mod error;
pub mod host;
pub mod location;
pub mod model;
pub mod sim;
pub mod source;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use affinity::{AffinityScheduler, AffinityThread, InlineScheduler, Task};
pub use error::{HostError, WifiError};
pub use host::{
    HostContext, Listener, ListenerId, Notification, NotificationFilter, NotificationKind, Radio,
};
pub use location::{
    ConfirmationSurface, LocationPrompt, LocationProvider, LocationService, is_location_enabled,
    prompt_enable_location, request_location_access,
};
pub use sim::{SimulatedHost, SimulatedRadio};
pub use source::ReactiveWifi;
pub use stream::{Disposable, Emitter, Observable, Subscription};

pub use model::{
    AccessPoint, Band, ConnectionInfo, ConnectionState, MacAddress, SignalLevel, SupplicantState,
    classify,
};
