//! Sensor telemetry input: one `SensorReading` per evaluation, produced
//! externally (simulator or hardware) and consumed read-only by the engine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub field_id: String,
    pub crop: String,
    /// Soil moisture, percent.  Out-of-range values (negative, >100) are
    /// legal and classify as out-of-range extremes, not errors.
    pub soil_moisture: f64,
    /// Air temperature, °C.
    pub temperature: f64,
    /// Air humidity, percent.
    pub humidity: f64,
    /// Chance of rain, percent.
    pub rainfall_probability: f64,
    pub hours_since_watering: f64,
    pub ph_level: Option<f64>,
}

impl SensorReading {
    /// Reject readings with non-finite required fields.  NaN or infinity in
    /// any numeric channel means the upstream producer is broken; such a
    /// reading must never reach the classifier or mutate pump state.
    pub fn validate(&self) -> Result<(), EngineError> {
        let checks: [(&'static str, f64); 5] = [
            ("soil_moisture", self.soil_moisture),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
            ("rainfall_probability", self.rainfall_probability),
            ("hours_since_watering", self.hours_since_watering),
        ];
        for (field, value) in checks {
            if !value.is_finite() {
                return Err(EngineError::InvalidReading { field, value });
            }
        }
        if let Some(ph) = self.ph_level {
            if !ph.is_finite() {
                return Err(EngineError::InvalidReading {
                    field: "ph_level",
                    value: ph,
                });
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
