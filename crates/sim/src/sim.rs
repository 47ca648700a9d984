//! Stateful field telemetry simulator for local development.
//!
//! Models plausible soil/weather behaviour per field:
//! - Temporal coherence via random walk with mean reversion
//! - Gradual drying drift (evaporation)
//! - Diurnal (day/night) temperature cycle
//! - Closed-loop watering response (moisture rises while the pump runs)
//! - Slow-moving rain forecast and humidity channels

use std::fmt;

use pump_engine::SensorReading;
use time::OffsetDateTime;

// ---------------------------------------------------------------------------
// Gaussian approximation (no extra dependency)
// ---------------------------------------------------------------------------

/// Approximate a sample from N(0,1) using the Irwin-Hall method:
/// sum of 12 uniform [0,1) values minus 6.
fn approx_std_normal() -> f64 {
    let mut sum: f64 = 0.0;
    for _ in 0..12 {
        sum += fastrand::f64();
    }
    sum - 6.0
}

/// Sample from N(mean, sigma).
fn gaussian(mean: f64, sigma: f64) -> f64 {
    mean + sigma * approx_std_normal()
}

// ---------------------------------------------------------------------------
// Scenario presets
// ---------------------------------------------------------------------------

/// Pre-configured simulation profiles selectable via `SIM_SCENARIO` env var.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Starts mid-range, steady drift toward dry.  Exercises the full
    /// start/recover/stop cycle of the engine.
    Drying,
    /// Hovers near the optimal band.  Good for watching the engine do
    /// nothing, correctly.
    Stable,
    /// Starts near the wet end, very slow drying.  Exercises the TOO_WET
    /// band and confirms no watering is triggered.
    Wet,
}

impl Scenario {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "stable" => Self::Stable,
            "wet" => Self::Wet,
            _ => Self::Drying, // default
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drying => write!(f, "drying"),
            Self::Stable => write!(f, "stable"),
            Self::Wet => write!(f, "wet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-field simulator
// ---------------------------------------------------------------------------

pub struct FieldSim {
    field_id: String,
    crop: String,

    /// Current "true" soil moisture, percent.  Evolves each sample.
    moisture: f64,
    rainfall: f64,
    hours_since_watering: f64,
    watering: bool,
    samples: u64,

    // Random walk parameters
    drift_per_sample: f64,
    walk_sigma: f64,
    mean_reversion: f64,
    center: f64,

    /// Moisture gain per sample while the pump runs, percent.
    wet_rate: f64,
    /// Simulated hours that pass per sample.
    hours_per_sample: f64,
    /// Samples per simulated day, for the diurnal temperature term.
    diurnal_period: f64,
}

impl FieldSim {
    pub fn new(scenario: Scenario, field_id: &str, crop: &str) -> Self {
        let (start, drift, walk_sigma, mean_rev, center) = match scenario {
            Scenario::Drying => (50.0, 0.6, 1.2, 0.01, 40.0),
            Scenario::Stable => (55.0, 0.05, 0.5, 0.05, 55.0),
            Scenario::Wet => (85.0, 0.15, 0.8, 0.02, 75.0),
        };

        Self {
            field_id: field_id.to_string(),
            crop: crop.to_string(),
            moisture: start + gaussian(0.0, 2.0),
            rainfall: fastrand::f64() * 60.0,
            hours_since_watering: fastrand::f64() * 24.0,
            watering: false,
            samples: 0,
            drift_per_sample: drift,
            walk_sigma,
            mean_reversion: mean_rev,
            center,
            wet_rate: 3.0,
            hours_per_sample: 0.5,
            diurnal_period: 48.0,
        }
    }

    /// Inform the simulator whether the pump is currently running, so the
    /// moisture trajectory closes the loop.
    pub fn set_watering(&mut self, active: bool) {
        if active && !self.watering {
            self.hours_since_watering = 0.0;
        }
        self.watering = active;
    }

    /// Produce the next telemetry reading.  Internal state evolves with each
    /// call, so call frequency matters.
    pub fn sample(&mut self) -> SensorReading {
        self.samples += 1;

        // -- Evolve moisture ------------------------------------------------
        let pull = self.mean_reversion * (self.center - self.moisture);
        let walk = gaussian(0.0, self.walk_sigma);
        self.moisture += pull + walk - self.drift_per_sample;
        if self.watering {
            self.moisture += self.wet_rate;
        }
        self.moisture = self.moisture.clamp(0.0, 100.0);

        // -- Side channels --------------------------------------------------
        let phase = (self.samples as f64) / self.diurnal_period * std::f64::consts::TAU;
        let temperature = 26.0 + 7.0 * phase.sin() + gaussian(0.0, 0.8);

        let humidity = (85.0 - 0.8 * temperature + gaussian(0.0, 3.0)).clamp(5.0, 100.0);

        // Rain forecast drifts slowly.
        self.rainfall = (self.rainfall + gaussian(0.0, 4.0)).clamp(0.0, 100.0);

        if !self.watering {
            self.hours_since_watering += self.hours_per_sample;
        }

        SensorReading {
            timestamp: OffsetDateTime::now_utc(),
            field_id: self.field_id.clone(),
            crop: self.crop.clone(),
            soil_moisture: round1(self.moisture),
            temperature: round1(temperature),
            humidity: round1(humidity),
            rainfall_probability: round1(self.rainfall),
            hours_since_watering: round1(self.hours_since_watering),
            ph_level: Some(round1(6.5 + gaussian(0.0, 0.15))),
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ===========================================================================
// Tests
// ===========================================================================
