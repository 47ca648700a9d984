//! Per-field pump state machine: manual/auto mode, hysteresis-guarded
//! start/stop, water-usage accrual, and the bounded audit log.
//!
//! One `FieldEngine` owns all mutable state for one field.  Multiple fields
//! are multiple instances; nothing is shared between them.  The engine is
//! fully synchronous — hosts that call it from several tasks wrap it in a
//! lock, hosts with a single driver loop own it directly.
//!
//! ## Hysteresis
//!
//! ```text
//!                 should_water
//! Stopped ──────────────────────────▶ Running
//!    ▲                                   │
//!    └───[!should_water AND moisture > optimal_min + margin]───┘
//! ```
//!
//! The stop condition is deliberately asymmetric: a pump started at critical
//! dryness is not stopped the instant moisture crosses back above `min`; it
//! must recover past `optimal_min` plus the configured margin.  Without the
//! asymmetry the pump would oscillate right at the dry boundary.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::config::EngineSettings;
use crate::decision::Decision;
use crate::error::EngineError;
use crate::profile::CropRegistry;
use crate::reading::SensorReading;
use crate::scorer::{LinearModel, ScoreFeatures};

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Manual,
    Auto,
}

#[derive(Debug, Clone, Serialize)]
pub struct PumpState {
    pub mode: Mode,
    pub running: bool,
    pub total_water_liters: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub message: String,
}

/// Snapshot handed to the UI/telemetry collaborator: current state, latest
/// decision, and the full audit history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: PumpState,
    pub last_decision: Option<Decision>,
    pub history: Vec<AuditEntry>,
}

/// Flat record appended by the external persistence collaborator once per
/// save-triggering event.  Field names match the existing sheet columns;
/// `humidity` carries the soil-moisture value for wire compatibility.
#[derive(Debug, Clone, Serialize)]
pub struct PersistRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub humidity: Option<f64>,
    pub pump_running: bool,
    pub total_water: f64,
    pub decision: Option<String>,
    pub mode: Mode,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct FieldEngine {
    field_id: String,
    registry: CropRegistry,
    settings: EngineSettings,
    /// Trained when predictive mode is enabled; training happens in `new`,
    /// before any `evaluate` call is reachable.
    model: Option<LinearModel>,
    state: PumpState,
    history: VecDeque<AuditEntry>,
    last_reading: Option<SensorReading>,
    last_decision: Option<Decision>,
}

impl FieldEngine {
    /// Build an engine for one field.  Initial state is manual mode, pump
    /// stopped, zero accrued water.
    pub fn new(
        field_id: &str,
        registry: CropRegistry,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let model = if settings.predictive {
            Some(LinearModel::train()?)
        } else {
            None
        };

        Ok(Self {
            field_id: field_id.to_string(),
            registry,
            history: VecDeque::with_capacity(settings.history_capacity),
            settings,
            model,
            state: PumpState {
                mode: Mode::Manual,
                running: false,
                total_water_liters: 0.0,
            },
            last_reading: None,
            last_decision: None,
        })
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn state(&self) -> &PumpState {
        &self.state
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    // -- Operations ---------------------------------------------------------

    /// Start the pump.  No-op if already running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.state.running = true;
        let mode = mode_label(self.state.mode);
        info!(field = %self.field_id, mode, "pump started");
        self.audit(format!("pump started ({mode} mode)"));
    }

    /// Stop the pump.  No-op if already stopped.
    pub fn stop(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.running = false;
        info!(field = %self.field_id, "pump stopped");
        self.audit("pump stopped".to_string());
    }

    /// Flip manual <-> auto.  Entering auto immediately re-evaluates the
    /// last reading, which may start the pump.  Leaving auto force-stops a
    /// running pump — manual control must not inherit an automatic run — and
    /// the whole transition is recorded as a single audit entry.
    pub fn toggle_mode(&mut self) {
        match self.state.mode {
            Mode::Manual => {
                self.state.mode = Mode::Auto;
                info!(field = %self.field_id, "auto mode enabled");
                self.audit("auto mode enabled".to_string());
                if let Some(reading) = self.last_reading.clone() {
                    // Already validated when it was first evaluated.
                    let _ = self.evaluate(&reading);
                }
            }
            Mode::Auto => {
                self.state.mode = Mode::Manual;
                if self.state.running {
                    self.state.running = false;
                    info!(field = %self.field_id, "manual mode enabled, pump stopped");
                    self.audit("manual mode enabled, pump stopped".to_string());
                } else {
                    info!(field = %self.field_id, "manual mode enabled");
                    self.audit("manual mode enabled".to_string());
                }
            }
        }
    }

    /// Evaluate a new telemetry reading.
    ///
    /// An invalid reading is rejected before anything is touched.  In manual
    /// mode the decision is recorded but never actuates the pump; in auto
    /// mode the hysteresis rule drives start/stop.
    pub fn evaluate(&mut self, reading: &SensorReading) -> Result<Decision, EngineError> {
        reading.validate()?;

        let (profile, known) = self.registry.resolve(&reading.crop);
        let profile = profile.clone();
        if !known {
            warn!(
                field = %self.field_id,
                crop = %reading.crop,
                fallback = %profile.name,
                "unknown crop, using default profile"
            );
            self.audit(format!(
                "unknown crop '{}', using {} profile",
                reading.crop, profile.name
            ));
        }

        let decision = if self.settings.predictive {
            let model = self
                .model
                .as_ref()
                .ok_or_else(|| EngineError::ModelNotReady("model was never trained".into()))?;
            model.score(&ScoreFeatures::from(reading), &self.settings.feature_ranges)
        } else {
            classify(reading.soil_moisture, &profile)
        };

        debug!(
            field = %self.field_id,
            moisture = reading.soil_moisture,
            action = %decision.action,
            should_water = decision.should_water,
            "edge analysis"
        );
        self.audit(format!("edge analysis: {}", decision.reason));

        if self.state.mode == Mode::Auto {
            let recovery = profile.optimal_min + self.settings.hysteresis_margin;
            if decision.should_water && !self.state.running {
                self.start();
            } else if !decision.should_water
                && self.state.running
                && reading.soil_moisture > recovery
            {
                self.stop();
            }
            // Otherwise hold: in particular a running pump stays on while
            // moisture sits between `min` and the recovery threshold.
        }

        self.last_reading = Some(reading.clone());
        self.last_decision = Some(decision.clone());
        Ok(decision)
    }

    /// Accrue water usage for an elapsed interval while the pump runs.
    /// Timer-driven by the host; idempotent per interval and safe to skip
    /// when the pump is stopped.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.state.running {
            return;
        }
        let minutes = elapsed.as_secs_f64() / 60.0;
        self.state.total_water_liters += self.settings.flow_rate_lpm * minutes;
    }

    /// External reset of the usage counter (e.g. a new billing period).
    pub fn reset_total_water(&mut self) {
        self.state.total_water_liters = 0.0;
        self.audit("water usage counter reset".to_string());
    }

    // -- Outputs ------------------------------------------------------------

    /// Status snapshot for the UI/telemetry collaborator.  History is
    /// newest-first and never longer than the configured capacity.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state.clone(),
            last_decision: self.last_decision.clone(),
            history: self.history.iter().rev().cloned().collect(),
        }
    }

    /// Flat record for the persistence collaborator.
    pub fn persist_record(&self) -> PersistRecord {
        PersistRecord {
            timestamp: OffsetDateTime::now_utc(),
            humidity: self.last_reading.as_ref().map(|r| r.soil_moisture),
            pump_running: self.state.running,
            total_water: self.state.total_water_liters,
            decision: self.last_decision.as_ref().map(|d| d.action.to_string()),
            mode: self.state.mode,
        }
    }

    // -- Internal -----------------------------------------------------------

    fn audit(&mut self, message: String) {
        if self.history.len() >= self.settings.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(AuditEntry {
            time: OffsetDateTime::now_utc(),
            message,
        });
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Manual => "manual",
        Mode::Auto => "auto",
    }
}

// ===========================================================================
// Tests
// ===========================================================================
