// ── Scan results and connection snapshots ──

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;
use super::signal::{SignalLevel, classify};
use super::supplicant::SupplicantState;

/// Frequency band an access point broadcasts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    Ghz2_4,
    #[serde(rename = "5GHz")]
    Ghz5,
    #[serde(rename = "6GHz")]
    Ghz6,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Band {
    pub fn from_frequency(mhz: u32) -> Self {
        match mhz {
            2400..=2500 => Self::Ghz2_4,
            4900..=5900 => Self::Ghz5,
            5925..=7125 => Self::Ghz6,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ghz2_4 => "2.4 GHz",
            Self::Ghz5 => "5 GHz",
            Self::Ghz6 => "6 GHz",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One network record from a completed scan.
///
/// Scan-completion notifications always deliver the full list of these,
/// never a diff against the previous list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ssid: String,
    pub bssid: MacAddress,
    /// Received signal strength in dBm.
    pub rssi: i32,
    pub frequency_mhz: u32,
    /// Security / capability flags as reported by the scanner,
    /// e.g. `"[WPA2-PSK-CCMP][ESS]"`.
    #[serde(default)]
    pub capabilities: String,
    /// Microseconds since boot when this record was last seen.
    #[serde(default)]
    pub timestamp_us: u64,
}

impl AccessPoint {
    pub fn band(&self) -> Band {
        Band::from_frequency(self.frequency_mhz)
    }

    /// Named level on the default five-band scale.
    pub fn signal_level(&self) -> SignalLevel {
        SignalLevel::from_level(classify(self.rssi, SignalLevel::COUNT))
    }

    /// Whether the capability string advertises any encryption.
    pub fn is_secured(&self) -> bool {
        ["WEP", "WPA", "SAE", "EAP", "OWE"]
            .iter()
            .any(|flag| self.capabilities.contains(flag))
    }
}

/// Snapshot of the currently associated network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub ssid: String,
    #[serde(default)]
    pub bssid: Option<MacAddress>,
    pub rssi: i32,
    #[serde(default)]
    pub link_speed_mbps: Option<u32>,
    #[serde(default)]
    pub frequency_mhz: Option<u32>,
    #[serde(default)]
    pub ip_address: Option<Ipv4Addr>,
    #[serde(default = "default_network_id")]
    pub network_id: i32,
    #[serde(default)]
    pub supplicant_state: SupplicantState,
}

/// SSID reported while not associated with any network.
pub const UNKNOWN_SSID: &str = "<unknown ssid>";

/// RSSI reported while not associated with any network.
pub const INVALID_RSSI: i32 = -127;

fn default_network_id() -> i32 {
    -1
}

impl ConnectionInfo {
    pub fn is_associated(&self) -> bool {
        self.network_id >= 0 && self.bssid.is_some()
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            ssid: UNKNOWN_SSID.into(),
            bssid: None,
            rssi: INVALID_RSSI,
            link_speed_mbps: None,
            frequency_mhz: None,
            ip_address: None,
            network_id: default_network_id(),
            supplicant_state: SupplicantState::Uninitialized,
        }
    }
}
