//! Weekly schedule optimizer: turns a week of per-day watering predictions
//! into an estimated usage figure and savings against a baseline.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Base watering duration in minutes for any watering day.
const BASE_DURATION_MIN: f64 = 20.0;

/// One prediction per forecast day, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPrediction {
    pub day: String,
    pub should_water: bool,
    pub soil_moisture: f64,
    pub temperature: f64,
}

/// Computed fresh per call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleOptimization {
    pub current_usage: f64,
    pub optimized_usage: f64,
    pub savings_percentage: f64,
    pub savings_liters: f64,
    pub watering_days: usize,
}

/// Estimate the watering duration for one predicted day, in minutes.
/// Dryness bonuses stack: below 30% adds 10 minutes, below 20% adds another
/// 10 on top of that.
fn duration_min(pred: &DayPrediction) -> f64 {
    let mut duration = BASE_DURATION_MIN;
    if pred.soil_moisture < 30.0 {
        duration += 10.0;
    }
    if pred.soil_moisture < 20.0 {
        duration += 10.0;
    }
    if pred.temperature > 30.0 {
        duration += 5.0;
    }
    duration
}

/// Aggregate a week of predictions into an optimized usage estimate.
///
/// `current_usage` is the baseline water consumption in liters and must be
/// positive; a zero baseline would divide the savings percentage by zero and
/// is rejected explicitly rather than letting NaN/infinity leak into the
/// output.
pub fn optimize(
    predictions: &[DayPrediction],
    current_usage: f64,
    flow_rate_lpm: f64,
) -> Result<ScheduleOptimization, EngineError> {
    if !(current_usage > 0.0) {
        return Err(EngineError::ZeroBaselineUsage(current_usage));
    }

    let mut optimized_usage = 0.0;
    let mut watering_days = 0;

    for pred in predictions.iter().filter(|p| p.should_water) {
        optimized_usage += duration_min(pred) * flow_rate_lpm;
        watering_days += 1;
    }

    let savings = (current_usage - optimized_usage) / current_usage * 100.0;

    Ok(ScheduleOptimization {
        current_usage,
        optimized_usage: optimized_usage.round(),
        savings_percentage: round1(savings),
        savings_liters: round1(current_usage - optimized_usage),
        watering_days,
    })
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FLOW: f64 = 5.0;

    fn day(name: &str, water: bool, moisture: f64, temp: f64) -> DayPrediction {
        DayPrediction {
            day: name.into(),
            should_water: water,
            soil_moisture: moisture,
            temperature: temp,
        }
    }

    // -- Duration rules -------------------------------------------------------

    #[test]
    fn base_duration_for_mild_day() {
        // moisture 40, temp 25: no bonuses, 20 min * 5 L/min = 100 L
        let out = optimize(&[day("Mon", true, 40.0, 25.0)], 200.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 100.0);
        assert_eq!(out.watering_days, 1);
    }

    #[test]
    fn dry_soil_bonus() {
        // moisture 25: +10 min -> 30 min -> 150 L
        let out = optimize(&[day("Mon", true, 25.0, 25.0)], 200.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 150.0);
    }

    #[test]
    fn very_dry_soil_bonuses_stack() {
        // moisture 15: +10 +10 -> 40 min -> 200 L
        let out = optimize(&[day("Mon", true, 15.0, 25.0)], 500.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 200.0);
    }

    #[test]
    fn hot_day_bonus() {
        // moisture 40, temp 32: +5 min -> 25 min -> 125 L
        let out = optimize(&[day("Mon", true, 40.0, 32.0)], 200.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 125.0);
    }

    #[test]
    fn all_bonuses_combined() {
        // moisture 15, temp 35: 20+10+10+5 = 45 min -> 225 L
        let out = optimize(&[day("Mon", true, 15.0, 35.0)], 500.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 225.0);
    }

    // -- Aggregation -----------------------------------------------------------

    #[test]
    fn non_watering_days_contribute_nothing() {
        let week = vec![
            day("Mon", true, 40.0, 25.0),
            day("Tue", false, 10.0, 40.0), // extreme but not watering
            day("Wed", true, 40.0, 25.0),
        ];
        let out = optimize(&week, 400.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 200.0);
        assert_eq!(out.watering_days, 2);
    }

    #[test]
    fn empty_week_uses_nothing() {
        let out = optimize(&[], 200.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 0.0);
        assert_eq!(out.watering_days, 0);
        assert_eq!(out.savings_percentage, 100.0);
        assert_eq!(out.savings_liters, 200.0);
    }

    #[test]
    fn savings_computed_against_baseline() {
        // One mild day: 100 L used from a 200 L baseline -> 50% saved
        let out = optimize(&[day("Mon", true, 40.0, 25.0)], 200.0, FLOW).unwrap();
        assert_eq!(out.savings_percentage, 50.0);
        assert_eq!(out.savings_liters, 100.0);
    }

    #[test]
    fn negative_savings_when_usage_exceeds_baseline() {
        let out = optimize(&[day("Mon", true, 15.0, 35.0)], 100.0, FLOW).unwrap();
        assert_eq!(out.optimized_usage, 225.0);
        assert_eq!(out.savings_percentage, -125.0);
        assert_eq!(out.savings_liters, -125.0);
    }

    // -- Failure modes ----------------------------------------------------------

    #[test]
    fn zero_baseline_is_an_error_not_nan() {
        let err = optimize(&[day("Mon", true, 40.0, 25.0)], 0.0, FLOW).unwrap_err();
        assert!(matches!(err, EngineError::ZeroBaselineUsage(_)));
    }

    #[test]
    fn negative_baseline_rejected() {
        assert!(optimize(&[], -5.0, FLOW).is_err());
    }

    #[test]
    fn nan_baseline_rejected() {
        assert!(optimize(&[], f64::NAN, FLOW).is_err());
    }

    #[test]
    fn output_never_contains_non_finite_values() {
        let week = vec![day("Mon", true, 15.0, 35.0), day("Tue", true, 25.0, 31.0)];
        let out = optimize(&week, 0.1, FLOW).unwrap();
        assert!(out.savings_percentage.is_finite());
        assert!(out.savings_liters.is_finite());
    }

    // -- Idempotence -------------------------------------------------------------

    #[test]
    fn identical_inputs_yield_identical_output() {
        let week = vec![
            day("Mon", true, 28.0, 33.0),
            day("Tue", false, 55.0, 24.0),
            day("Wed", true, 18.0, 29.0),
        ];
        let a = optimize(&week, 300.0, FLOW).unwrap();
        let b = optimize(&week, 300.0, FLOW).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
