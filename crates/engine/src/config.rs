//! TOML config loading and validation for the decision engine.
//!
//! The engine consumes configuration, it does not own it: crop profile
//! table, flow rate, audit-log capacity, hysteresis margin, and the scorer's
//! feature ranges are all adjustable here so tests can run the engine against
//! different domains without code changes.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::profile::{CropProfile, CropRegistry};
use crate::scorer::FeatureRanges;

// ---------------------------------------------------------------------------
// Engine settings (the validated, ready-to-use subset)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Pump flow rate in liters per minute; used by `tick` accrual and the
    /// schedule optimizer.
    pub flow_rate_lpm: f64,
    /// Audit log capacity (FIFO eviction beyond this).
    pub history_capacity: usize,
    /// Extra moisture clearance above `optimal_min` required before an
    /// automatic stop.
    pub hysteresis_margin: f64,
    /// When set, evaluations use the predictive scorer instead of the
    /// threshold classifier.
    pub predictive: bool,
    pub feature_ranges: FeatureRanges,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            flow_rate_lpm: 5.0,
            history_capacity: 20,
            hysteresis_margin: 0.0,
            predictive: false,
            feature_ranges: FeatureRanges::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config file structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::flow_rate_lpm")]
    pub flow_rate_lpm: f64,
    #[serde(default = "defaults::history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub hysteresis_margin: f64,
    #[serde(default)]
    pub predictive: bool,
    #[serde(default = "defaults::default_crop")]
    pub default_crop: String,
    #[serde(default)]
    pub feature_ranges: FeatureRanges,
    /// Crop profile table.  Empty means "use the built-in registry".
    #[serde(default)]
    pub crops: Vec<CropEntry>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CropEntry {
    pub name: String,
    pub min: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub struct FieldEntry {
    pub field_id: String,
    pub name: String,
    pub crop: String,
}

mod defaults {
    pub fn flow_rate_lpm() -> f64 {
        5.0
    }
    pub fn history_capacity() -> usize {
        20
    }
    pub fn default_crop() -> String {
        "Tomatoes".to_string()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Validate all entries.  Returns `Ok(())` or an error describing every
    /// violation found (not just the first one).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if !(self.flow_rate_lpm > 0.0) {
            errors.push(format!(
                "flow_rate_lpm must be positive, got {}",
                self.flow_rate_lpm
            ));
        }
        if self.history_capacity == 0 {
            errors.push("history_capacity must be at least 1".to_string());
        }
        if !(self.hysteresis_margin >= 0.0) {
            errors.push(format!(
                "hysteresis_margin must be non-negative, got {}",
                self.hysteresis_margin
            ));
        }

        self.validate_feature_ranges(&mut errors);
        self.validate_crops(&mut errors);
        self.validate_fields(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    fn validate_feature_ranges(&self, errors: &mut Vec<String>) {
        let r = &self.feature_ranges;
        let checks = [
            ("moisture", r.moisture),
            ("temperature", r.temperature),
            ("humidity", r.humidity),
            ("rainfall", r.rainfall),
            ("hours_since_watering", r.hours_since_watering),
        ];
        for (name, value) in checks {
            if !(value > 0.0) {
                errors.push(format!(
                    "feature_ranges.{name} must be positive, got {value}"
                ));
            }
        }
    }

    fn validate_crops(&self, errors: &mut Vec<String>) {
        let mut seen: HashSet<&str> = HashSet::new();

        for (i, c) in self.crops.iter().enumerate() {
            let ctx = || {
                if c.name.is_empty() {
                    format!("crops[{i}]")
                } else {
                    format!("crop '{}'", c.name)
                }
            };

            if c.name.trim().is_empty() {
                errors.push(format!("{}: name is empty", ctx()));
            } else if !seen.insert(&c.name) {
                errors.push(format!("{}: duplicate crop name", ctx()));
            }

            // Band-ordering invariant: min < optimal_min < optimal_max < max.
            let profile = CropProfile::new("", c.min, c.optimal_min, c.optimal_max, c.max);
            if !profile.is_ordered() {
                errors.push(format!(
                    "{}: bounds must satisfy min < optimal_min < optimal_max < max, got {}/{}/{}/{}",
                    ctx(),
                    c.min,
                    c.optimal_min,
                    c.optimal_max,
                    c.max
                ));
            }
        }

        // The fallback target itself must resolve, whether against the
        // configured table or the built-in registry.
        let known_default = if self.crops.is_empty() {
            CropRegistry::default().resolve(&self.default_crop).1
        } else {
            self.crops.iter().any(|c| c.name == self.default_crop)
        };
        if !known_default {
            errors.push(format!(
                "default_crop '{}' is not in the crop table",
                self.default_crop
            ));
        }
    }

    fn validate_fields(&self, errors: &mut Vec<String>) {
        let mut seen: HashSet<&str> = HashSet::new();

        for (i, f) in self.fields.iter().enumerate() {
            let ctx = || {
                if f.field_id.is_empty() {
                    format!("fields[{i}]")
                } else {
                    format!("field '{}'", f.field_id)
                }
            };

            if f.field_id.trim().is_empty() {
                errors.push(format!("{}: field_id is empty", ctx()));
            } else if !seen.insert(&f.field_id) {
                errors.push(format!("{}: duplicate field_id", ctx()));
            }

            if f.name.trim().is_empty() {
                errors.push(format!("{}: name is empty", ctx()));
            }
            // An unknown crop is allowed: it resolves to the default profile
            // at evaluation time, with a warning audit note.
        }
    }

    /// Engine settings subset.
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            flow_rate_lpm: self.flow_rate_lpm,
            history_capacity: self.history_capacity,
            hysteresis_margin: self.hysteresis_margin,
            predictive: self.predictive,
            feature_ranges: self.feature_ranges,
        }
    }

    /// Build the crop registry: the configured table, or the built-in
    /// profiles when the table is empty.
    pub fn registry(&self) -> CropRegistry {
        if self.crops.is_empty() {
            let builtin = CropRegistry::default();
            if builtin.resolve(&self.default_crop).1 {
                return CropRegistry::new(builtin.profiles_vec(), &self.default_crop);
            }
            return builtin;
        }
        CropRegistry::new(
            self.crops
                .iter()
                .map(|c| CropProfile::new(&c.name, c.min, c.optimal_min, c.optimal_max, c.max))
                .collect(),
            &self.default_crop,
        )
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file.
pub fn load(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;
    config.validate()?;

    tracing::info!(
        crops = config.crops.len(),
        fields = config.fields.len(),
        predictive = config.predictive,
        "config loaded"
    );
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
