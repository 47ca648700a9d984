//! The watering decision produced by the classifier and the scorer.  Derived
//! from a reading, never mutated after creation.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    CriticalWaterNow,
    WaterSoon,
    Optimal,
    CanWait,
    TooWet,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CriticalWaterNow => "CRITICAL_WATER_NOW",
            Self::WaterSoon => "WATER_SOON",
            Self::Optimal => "OPTIMAL",
            Self::CanWait => "CAN_WAIT",
            Self::TooWet => "TOO_WET",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Normal,
    Low,
}

/// Normalized feature contributions attached by the predictive scorer,
/// purely for explainability.  Each value is the raw feature divided by its
/// configured domain max, clamped to [0, 1]; none of them feed back into the
/// decision itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Factors {
    pub moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub last_watering: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub action: Action,
    pub should_water: bool,
    pub urgency: Urgency,
    pub reason: String,
    /// Confidence in [0, 100].  The threshold classifier is a fixed rule and
    /// reports 100; the scorer reports its clamped model confidence (≤95).
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<Factors>,
}

// ===========================================================================
// Tests
// ===========================================================================
