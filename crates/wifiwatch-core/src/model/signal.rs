// ── Signal strength classification ──
//
// Maps a signed RSSI reading (dBm, more negative = weaker) onto a
// discrete level using the platform's legacy banding rule.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Weakest RSSI the banding rule distinguishes. Anything at or below is level 0.
pub const MIN_RSSI: i32 = -100;

/// Strongest RSSI the banding rule distinguishes. Anything at or above is the top level.
pub const MAX_RSSI: i32 = -55;

/// Classify `rssi` into one of `levels` contiguous bands.
///
/// Returns a value in `[0, levels - 1]`. The function is a monotonic step
/// function of `rssi`: readings at or below [`MIN_RSSI`] clamp to `0`,
/// readings at or above [`MAX_RSSI`] clamp to `levels - 1`, and the open
/// interval between is split into equal-width bands with integer
/// truncation (ties fall into the weaker band). A `levels` of `0` is
/// treated as `1`.
pub fn classify(rssi: i32, levels: u32) -> u32 {
    let levels = levels.max(1);

    if rssi <= MIN_RSSI {
        return 0;
    }
    if rssi >= MAX_RSSI {
        return levels - 1;
    }

    let input_range = i64::from(MAX_RSSI - MIN_RSSI);
    let output_range = i64::from(levels - 1);
    let level = i64::from(rssi - MIN_RSSI) * output_range / input_range;

    // `level` is within [0, levels - 1] by construction.
    u32::try_from(level).unwrap_or(0)
}

/// Named signal level for the default five-band classification.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalLevel {
    #[default]
    NoSignal,
    Poor,
    Fair,
    Good,
    Excellent,
}

/// `(variant, level, description)` mapping table.
const LEVELS: [(SignalLevel, u32, &str); 5] = [
    (SignalLevel::NoSignal, 0, "no signal"),
    (SignalLevel::Poor, 1, "poor"),
    (SignalLevel::Fair, 2, "fair"),
    (SignalLevel::Good, 3, "good"),
    (SignalLevel::Excellent, 4, "excellent"),
];

impl SignalLevel {
    /// Number of named levels; the default level count for classification.
    pub const COUNT: u32 = 5;

    /// Numeric level of this variant.
    pub fn level(self) -> u32 {
        LEVELS
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or(0, |(_, level, _)| *level)
    }

    /// Human-readable label.
    pub fn description(self) -> &'static str {
        LEVELS
            .iter()
            .find(|(variant, _, _)| *variant == self)
            .map_or("no signal", |(_, _, description)| *description)
    }

    /// Look up the variant for a numeric level. Out-of-range levels map to
    /// [`SignalLevel::NoSignal`].
    pub fn from_level(level: u32) -> Self {
        LEVELS
            .iter()
            .find(|(_, l, _)| *l == level)
            .map_or(Self::NoSignal, |(variant, _, _)| *variant)
    }

    /// Highest named level.
    pub fn max_level() -> u32 {
        Self::Excellent.level()
    }

    /// Classify an RSSI reading directly into a named level.
    pub fn from_rssi(rssi: i32) -> Self {
        Self::from_level(classify(rssi, Self::COUNT))
    }
}

impl fmt::Display for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
