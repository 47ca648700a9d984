//! Irrigation decision engine: decides from live soil/weather telemetry
//! whether a field's pump should run, for how long, and why — with an
//! auditable rationale.
//!
//! Four components, all pure computation:
//!
//! - [`classify`]: threshold classifier mapping moisture onto five watering
//!   bands per crop profile
//! - [`scorer`]: deterministic linear model scoring a wider feature set into
//!   a watering probability with explainable factors
//! - [`pump::FieldEngine`]: per-field state machine with hysteresis, mode
//!   handling, and a bounded audit log (the only stateful piece)
//! - [`optimize`]: weekly schedule optimizer estimating water savings
//!
//! Transport, persistence, and UI are external collaborators: readings come
//! in via [`reading::SensorReading`], results go out as
//! [`pump::StatusSnapshot`] and [`pump::PersistRecord`].

pub mod classify;
pub mod config;
pub mod decision;
pub mod error;
pub mod optimize;
pub mod profile;
pub mod pump;
pub mod reading;
pub mod scorer;

pub use classify::classify;
pub use config::{Config, EngineSettings};
pub use decision::{Action, Decision, Urgency};
pub use error::{ConfigError, EngineError};
pub use optimize::{optimize, DayPrediction, ScheduleOptimization};
pub use profile::{CropProfile, CropRegistry};
pub use pump::{FieldEngine, Mode, PumpState, StatusSnapshot};
pub use reading::SensorReading;
