// ── Domain model ──
//
// Typed values carried by the WiFi event streams. Every enumeration keeps
// its platform mapping as static table data, decoupled from the variant
// discriminant.

pub mod mac;
pub mod network;
pub mod signal;
pub mod state;
pub mod supplicant;

pub use mac::MacAddress;
pub use network::{AccessPoint, Band, ConnectionInfo, INVALID_RSSI, UNKNOWN_SSID};
pub use signal::{MAX_RSSI, MIN_RSSI, SignalLevel, classify};
pub use state::ConnectionState;
pub use supplicant::SupplicantState;
