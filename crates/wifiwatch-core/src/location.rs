// ── Location access ──
//
// Scan results require the location service. The streams never check it
// themselves; the presentation layer calls these helpers before
// subscribing to access points and surfaces the prompt when needed.

use serde::{Deserialize, Serialize};

/// Location providers whose state decides whether location is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    Gps,
    Network,
}

/// Host capability reporting location provider state.
pub trait LocationService: Send + Sync {
    fn is_provider_enabled(&self, provider: LocationProvider) -> bool;
}

/// Location is available when either the GPS or the network provider is on.
pub fn is_location_enabled(service: &dyn LocationService) -> bool {
    service.is_provider_enabled(LocationProvider::Gps)
        || service.is_provider_enabled(LocationProvider::Network)
}

/// Text shown when asking the user to enable location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPrompt {
    pub title: String,
    pub message: String,
}

impl Default for LocationPrompt {
    fn default() -> Self {
        Self {
            title: "Requesting location access".into(),
            message: "Do you want to open location settings?".into(),
        }
    }
}

/// Surface able to ask for confirmation and deep-link to system settings.
pub trait ConfirmationSurface {
    /// Show `prompt`; `true` if the user accepted.
    fn confirm(&self, prompt: &LocationPrompt) -> bool;

    /// Open the system's location settings.
    fn open_location_settings(&self);
}

/// Show `prompt` and run `on_confirm` only if the user accepts.
/// Returns whether the prompt was accepted.
pub fn prompt_enable_location<F>(
    surface: &dyn ConfirmationSurface,
    prompt: &LocationPrompt,
    on_confirm: F,
) -> bool
where
    F: FnOnce(),
{
    let accepted = surface.confirm(prompt);
    if accepted {
        on_confirm();
    }
    accepted
}

/// Ask the user to enable location, opening the settings on confirmation.
pub fn request_location_access(surface: &dyn ConfirmationSurface, prompt: &LocationPrompt) -> bool {
    prompt_enable_location(surface, prompt, || surface.open_location_settings())
}
