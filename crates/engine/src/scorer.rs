//! Predictive scorer: a fixed linear model over five telemetry features,
//! trained once at engine construction by ordinary least squares on a
//! hard-coded six-row labelled dataset (three "water", three "don't water"
//! exemplars spanning the feature space).
//!
//! Training solves the normal equations with Gaussian elimination (partial
//! pivoting) — the system is only 6×6, so no linear-algebra crate is pulled
//! in.  Training is fully deterministic: the same dataset always reproduces
//! the same coefficients, which is a tested property of the engine, not an
//! implementation detail.

use serde::{Deserialize, Serialize};

use crate::decision::{Action, Decision, Factors, Urgency};
use crate::error::EngineError;
use crate::reading::SensorReading;

/// Feature order: moisture, temperature, humidity, rainfall probability,
/// hours since last watering.
const FEATURES: usize = 5;

/// Labelled exemplars.  Rows 0-2 are "water" days, rows 3-5 "don't water".
const TRAIN_X: [[f64; FEATURES]; 6] = [
    [30.0, 32.0, 40.0, 15.0, 36.0],
    [20.0, 35.0, 30.0, 10.0, 48.0],
    [15.0, 38.0, 25.0, 5.0, 60.0],
    [65.0, 24.0, 60.0, 75.0, 12.0],
    [70.0, 20.0, 70.0, 80.0, 8.0],
    [55.0, 22.0, 65.0, 70.0, 10.0],
];
const TRAIN_Y: [f64; 6] = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

/// Confidence is reported in [0, 95]: the model is a six-point linear fit
/// and should never claim certainty.
const CONFIDENCE_CAP: f64 = 95.0;

// ---------------------------------------------------------------------------
// Feature extraction & normalization ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ScoreFeatures {
    pub moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall_probability: f64,
    pub hours_since_watering: f64,
}

impl From<&SensorReading> for ScoreFeatures {
    fn from(r: &SensorReading) -> Self {
        Self {
            moisture: r.soil_moisture,
            temperature: r.temperature,
            humidity: r.humidity,
            rainfall_probability: r.rainfall_probability,
            hours_since_watering: r.hours_since_watering,
        }
    }
}

/// Domain maxima used to normalize the explainability factors.  Adjustable
/// via config so the engine can be tested against different sensor domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRanges {
    pub moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub hours_since_watering: f64,
}

impl Default for FeatureRanges {
    fn default() -> Self {
        Self {
            moisture: 100.0,
            temperature: 40.0,
            humidity: 100.0,
            rainfall: 100.0,
            hours_since_watering: 48.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Linear model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coef: [f64; FEATURES],
    intercept: f64,
}

impl LinearModel {
    /// Train on the fixed built-in dataset.  Synchronous; completes before
    /// any `score` call is reachable, so `ModelNotReady` is a startup-only
    /// failure.
    pub fn train() -> Result<Self, EngineError> {
        Self::train_on(&TRAIN_X, &TRAIN_Y)
    }

    /// Ordinary least squares via the normal equations `(XᵀX)β = Xᵀy`, with
    /// X augmented by an intercept column.
    fn train_on(x: &[[f64; FEATURES]; 6], y: &[f64; 6]) -> Result<Self, EngineError> {
        const N: usize = FEATURES + 1; // + intercept

        // Build A = XᵀX and b = Xᵀy in one pass.  Column N-1 is the
        // intercept (all ones).
        let mut a = [[0.0f64; N]; N];
        let mut b = [0.0f64; N];
        for (row, &target) in x.iter().zip(y.iter()) {
            let mut aug = [0.0f64; N];
            aug[..FEATURES].copy_from_slice(row);
            aug[N - 1] = 1.0;
            for i in 0..N {
                for j in 0..N {
                    a[i][j] += aug[i] * aug[j];
                }
                b[i] += aug[i] * target;
            }
        }

        let beta = solve(&mut a, &mut b)?;

        let mut coef = [0.0f64; FEATURES];
        coef.copy_from_slice(&beta[..FEATURES]);
        Ok(Self {
            coef,
            intercept: beta[N - 1],
        })
    }

    /// Raw model output.  Historically treated as a probability but actually
    /// an unbounded real; callers must clamp anything derived from it.
    pub fn predict(&self, f: &ScoreFeatures) -> f64 {
        self.intercept
            + self.coef[0] * f.moisture
            + self.coef[1] * f.temperature
            + self.coef[2] * f.humidity
            + self.coef[3] * f.rainfall_probability
            + self.coef[4] * f.hours_since_watering
    }

    /// Score a feature vector into a full `Decision`.
    pub fn score(&self, f: &ScoreFeatures, ranges: &FeatureRanges) -> Decision {
        let p = self.predict(f);
        let should_water = p > 0.5;

        // The raw output can leave [0, 1] entirely, which once produced
        // negative and >100 confidences downstream.  Clamp both sides.
        let confidence = if should_water {
            (p.abs() * 100.0).clamp(0.0, CONFIDENCE_CAP)
        } else {
            ((1.0 - p) * 100.0).clamp(0.0, CONFIDENCE_CAP)
        };

        let (action, urgency, verdict) = if should_water {
            (Action::WaterSoon, Urgency::High, "watering recommended")
        } else {
            (Action::CanWait, Urgency::Normal, "no watering needed")
        };

        Decision {
            action,
            should_water,
            urgency,
            reason: format!("Predictive model: {verdict} (score {p:.2})"),
            confidence,
            factors: Some(Factors {
                moisture: norm(f.moisture, ranges.moisture),
                temperature: norm(f.temperature, ranges.temperature),
                humidity: norm(f.humidity, ranges.humidity),
                rainfall: norm(f.rainfall_probability, ranges.rainfall),
                last_watering: norm(f.hours_since_watering, ranges.hours_since_watering),
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn coefficients(&self) -> ([f64; FEATURES], f64) {
        (self.coef, self.intercept)
    }
}

fn norm(value: f64, max: f64) -> f64 {
    (value / max).clamp(0.0, 1.0)
}

/// Solve the N×N system `a·x = b` in place, Gaussian elimination with
/// partial pivoting.
fn solve<const N: usize>(
    a: &mut [[f64; N]; N],
    b: &mut [f64; N],
) -> Result<[f64; N], EngineError> {
    for col in 0..N {
        // Pivot: largest absolute value in this column.
        let mut pivot = col;
        for row in col + 1..N {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-9 {
            return Err(EngineError::ModelNotReady(
                "singular normal-equation system".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..N {
            let factor = a[row][col] / a[col][col];
            for k in col..N {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution.
    let mut x = [0.0f64; N];
    for col in (0..N).rev() {
        let mut sum = b[col];
        for k in col + 1..N {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    Ok(x)
}

// ===========================================================================
// Tests
// ===========================================================================
