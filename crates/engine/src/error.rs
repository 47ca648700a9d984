//! Typed errors for the decision engine.  Every failure the core can produce
//! is local and explicit; nothing is ever coerced into a default watering
//! decision.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A required numeric field of a sensor reading is missing or not a
    /// finite number.  The reading is rejected and no state is mutated.
    #[error("invalid reading: {field} is {value} (must be a finite number)")]
    InvalidReading { field: &'static str, value: f64 },

    /// The schedule optimizer was called with a zero (or negative) baseline
    /// usage — savings would divide by zero.
    #[error("baseline water usage must be positive, got {0}")]
    ZeroBaselineUsage(f64),

    /// The predictive model could not be trained (singular normal-equation
    /// system).  Unreachable with the shipped training set; callers treat it
    /// as fatal at startup.
    #[error("predictive model is not ready: {0}")]
    ModelNotReady(String),
}

/// Errors produced while loading or validating an engine config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    /// Validation reports every violation found, not just the first one.
    #[error("config validation failed ({} error{}):\n  - {}",
        .0.len(),
        if .0.len() == 1 { "" } else { "s" },
        .0.join("\n  - "))]
    Invalid(Vec<String>),
}

// ===========================================================================
// Tests
// ===========================================================================
