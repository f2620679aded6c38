//! Replay scripts: an initial radio setup plus ordered notifications.
//!
//! ```toml
//! [location]
//! gps = false
//! network = false
//!
//! [radio]
//! rssi = -61
//!
//! [[radio.access_points]]
//! ssid = "office"
//! bssid = "02:00:00:00:00:01"
//! rssi = -61
//! frequency_mhz = 5180
//!
//! [[step]]
//! notification = "supplicant-state-changed"
//! state = "COMPLETED"
//! ```

use std::path::Path;

use serde::Deserialize;

use wifiwatch_core::{AccessPoint, ConnectionInfo, Notification, SimulatedHost, SimulatedRadio};

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Whether the simulated host has a WiFi radio at all.
    #[serde(default = "default_true")]
    pub radio_available: bool,

    #[serde(default)]
    pub location: LocationToggles,

    #[serde(default)]
    pub radio: RadioSetup,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationToggles {
    #[serde(default = "default_true")]
    pub gps: bool,
    #[serde(default = "default_true")]
    pub network: bool,
}

impl Default for LocationToggles {
    fn default() -> Self {
        Self {
            gps: true,
            network: true,
        }
    }
}

/// Radio readings in place before the first step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadioSetup {
    pub rssi: Option<i32>,
    #[serde(default)]
    pub access_points: Vec<AccessPoint>,
    pub connection: Option<ConnectionInfo>,
}

/// One notification to deliver. Optional extras update the radio first,
/// the way real hardware changes before it broadcasts.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "notification", rename_all = "kebab-case")]
pub enum Step {
    RadioStateChanged {
        #[serde(default)]
        state: Option<i32>,
    },
    SignalChanged {
        #[serde(default)]
        rssi: Option<i32>,
    },
    ScanCompleted {
        #[serde(default = "default_true")]
        updated: bool,
        #[serde(default)]
        access_points: Option<Vec<AccessPoint>>,
    },
    SupplicantStateChanged {
        #[serde(default)]
        state: Option<String>,
        #[serde(default)]
        connection: Option<ConnectionInfo>,
    },
    SupplicantConnectionChanged {
        #[serde(default)]
        connected: Option<bool>,
    },
}

fn default_true() -> bool {
    true
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let script_err = |reason: String| CliError::Script {
            path: path.display().to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| script_err(e.to_string()))?;
        toml::from_str(&text).map_err(|e| script_err(e.to_string()))
    }

    /// Build the simulated host this script starts from.
    pub fn host(&self) -> SimulatedHost {
        let host = if self.radio_available {
            SimulatedHost::new()
        } else {
            SimulatedHost::without_radio()
        };
        host.set_location(self.location.gps, self.location.network);
        if let Some(radio) = host.radio_handle() {
            self.radio.apply(radio);
        }
        host
    }
}

impl RadioSetup {
    fn apply(&self, radio: &SimulatedRadio) {
        if let Some(rssi) = self.rssi {
            radio.set_rssi(rssi);
        }
        radio.set_scan_results(self.access_points.clone());
        if let Some(connection) = &self.connection {
            radio.set_connection_info(connection.clone());
        }
    }
}

impl Step {
    /// Update the radio with this step's extras, if there is a radio.
    pub fn prepare(&self, radio: Option<&SimulatedRadio>) {
        let Some(radio) = radio else {
            return;
        };
        match self {
            Self::SignalChanged { rssi: Some(rssi) } => radio.set_rssi(*rssi),
            Self::ScanCompleted {
                access_points: Some(access_points),
                ..
            } => radio.set_scan_results(access_points.clone()),
            Self::SupplicantStateChanged {
                connection: Some(connection),
                ..
            } => radio.set_connection_info(connection.clone()),
            _ => {}
        }
    }

    pub fn notification(&self) -> Notification {
        match self {
            Self::RadioStateChanged { state } => Notification::RadioStateChanged { state: *state },
            Self::SignalChanged { rssi } => Notification::SignalChanged { rssi: *rssi },
            Self::ScanCompleted { updated, .. } => Notification::ScanCompleted { updated: *updated },
            Self::SupplicantStateChanged { state, .. } => Notification::SupplicantStateChanged {
                state: state.clone(),
            },
            Self::SupplicantConnectionChanged { connected } => {
                Notification::SupplicantConnectionChanged {
                    connected: *connected,
                }
            }
        }
    }
}
