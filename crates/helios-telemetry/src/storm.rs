//! Geomagnetic storm classification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StormLevel {
    Quiet,
    Active,
    Minor,
    Moderate,
    Strong,
    Severe,
}

impl StormLevel {
    /// Level for a planetary Kp index.
    pub fn from_kp(kp: f64) -> Self {
        match kp {
            k if k < 4.0 => StormLevel::Quiet,
            k if k < 5.0 => StormLevel::Active,
            k if k < 6.0 => StormLevel::Minor,
            k if k < 7.0 => StormLevel::Moderate,
            k if k < 8.0 => StormLevel::Strong,
            _ => StormLevel::Severe,
        }
    }
}

/// Rough Dst estimate in nT from Kp and the IMF Bz component, floored at
/// -500.
pub fn estimate_dst(kp: f64, bz: f64) -> f64 {
    let base = -30.0 * (kp - 3.0).max(0.0);
    let southward = if bz < 0.0 { bz * 10.0 } else { 0.0 };
    (base + southward).max(-500.0)
}
