//! Threshold classifier: maps a moisture value onto one of five watering
//! bands defined by a crop profile.
//!
//! The bands are contiguous half-open ranges (lower bound inclusive, upper
//! exclusive) built from the profile's four bounds, so every real moisture
//! value — including negative or >100 sensor glitches — lands in exactly one
//! band:
//!
//! ```text
//!          min        optimal_min     optimal_max       max
//! ──────────┼──────────────┼───────────────┼──────────────┼──────────▶
//!  CRITICAL │  WATER_SOON  │    OPTIMAL    │   CAN_WAIT   │  TOO_WET
//! ```

use crate::decision::{Action, Decision, Urgency};
use crate::profile::CropProfile;

/// Classify a moisture reading against a crop profile.  Pure and total.
pub fn classify(moisture: f64, profile: &CropProfile) -> Decision {
    let crop = &profile.name;

    let (action, should_water, urgency, reason) = if moisture < profile.min {
        (
            Action::CriticalWaterNow,
            true,
            Urgency::Critical,
            format!(
                "Soil is critically dry for {crop} ({moisture:.1}% < {:.0}%). Immediate watering needed!",
                profile.min
            ),
        )
    } else if moisture < profile.optimal_min {
        (
            Action::WaterSoon,
            true,
            Urgency::High,
            format!(
                "Soil is dry for {crop} ({moisture:.1}%). Water in the next 2-3 hours."
            ),
        )
    } else if moisture < profile.optimal_max {
        (
            Action::Optimal,
            false,
            Urgency::Low,
            format!(
                "Soil moisture is optimal for {crop} ({moisture:.1}%). Excellent conditions!"
            ),
        )
    } else if moisture < profile.max {
        (
            Action::CanWait,
            false,
            Urgency::Low,
            format!(
                "Soil has plenty of water for {crop} ({moisture:.1}%). Monitor in 6-8 hours."
            ),
        )
    } else {
        (
            Action::TooWet,
            false,
            Urgency::Medium,
            format!(
                "Soil is too wet for {crop} ({moisture:.1}% >= {:.0}%). Risk of root rot. Check drainage.",
                profile.max
            ),
        )
    };

    Decision {
        action,
        should_water,
        urgency,
        reason,
        confidence: 100.0, // fixed rule, not a prediction
        factors: None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CropRegistry;

    fn tomatoes() -> CropProfile {
        CropProfile::new("Tomatoes", 35.0, 45.0, 65.0, 75.0)
    }

    // -- Band membership -----------------------------------------------------

    #[test]
    fn below_min_is_critical() {
        let d = classify(20.0, &tomatoes());
        assert_eq!(d.action, Action::CriticalWaterNow);
        assert!(d.should_water);
        assert_eq!(d.urgency, Urgency::Critical);
    }

    #[test]
    fn between_min_and_optimal_min_is_water_soon() {
        let d = classify(40.0, &tomatoes());
        assert_eq!(d.action, Action::WaterSoon);
        assert!(d.should_water);
        assert_eq!(d.urgency, Urgency::High);
    }

    #[test]
    fn optimal_band() {
        let d = classify(55.0, &tomatoes());
        assert_eq!(d.action, Action::Optimal);
        assert!(!d.should_water);
        assert_eq!(d.urgency, Urgency::Low);
    }

    #[test]
    fn can_wait_band() {
        let d = classify(70.0, &tomatoes());
        assert_eq!(d.action, Action::CanWait);
        assert!(!d.should_water);
    }

    #[test]
    fn at_or_above_max_is_too_wet() {
        let d = classify(80.0, &tomatoes());
        assert_eq!(d.action, Action::TooWet);
        assert!(!d.should_water);
        assert_eq!(d.urgency, Urgency::Medium);
    }

    // -- Boundary convention: lower inclusive, upper exclusive ---------------
    //
    // The system previously had three independent threshold implementations
    // with conflicting `<` / `<=` boundaries; half-open bands are the single
    // convention now, pinned here.

    #[test]
    fn boundary_min_belongs_to_water_soon() {
        assert_eq!(classify(35.0, &tomatoes()).action, Action::WaterSoon);
    }

    #[test]
    fn boundary_optimal_min_belongs_to_optimal() {
        assert_eq!(classify(45.0, &tomatoes()).action, Action::Optimal);
    }

    #[test]
    fn boundary_optimal_max_belongs_to_can_wait() {
        assert_eq!(classify(65.0, &tomatoes()).action, Action::CanWait);
    }

    #[test]
    fn boundary_max_belongs_to_too_wet() {
        assert_eq!(classify(75.0, &tomatoes()).action, Action::TooWet);
    }

    // -- Totality over out-of-range inputs ------------------------------------

    #[test]
    fn negative_moisture_is_critical() {
        let d = classify(-12.5, &tomatoes());
        assert_eq!(d.action, Action::CriticalWaterNow);
        assert!(d.should_water);
    }

    #[test]
    fn above_hundred_is_too_wet() {
        let d = classify(140.0, &tomatoes());
        assert_eq!(d.action, Action::TooWet);
        assert!(!d.should_water);
    }

    /// Bands partition the real line with no gaps or overlaps, for every
    /// registered crop profile.
    #[test]
    fn bands_partition_for_every_profile() {
        let registry = CropRegistry::default();
        for crop in ["Tomatoes", "Onions", "Mint"] {
            let (profile, _) = registry.resolve(crop);
            let mut m = -20.0;
            let mut last_action = classify(m, profile).action;
            let expected_order = [
                Action::CriticalWaterNow,
                Action::WaterSoon,
                Action::Optimal,
                Action::CanWait,
                Action::TooWet,
            ];
            let mut seen = vec![last_action];
            while m <= 120.0 {
                let action = classify(m, profile).action;
                if action != last_action {
                    seen.push(action);
                    last_action = action;
                }
                m += 0.25;
            }
            assert_eq!(seen, expected_order, "band sweep for {crop}");
        }
    }

    #[test]
    fn reason_mentions_crop_and_value() {
        let d = classify(20.0, &tomatoes());
        assert!(d.reason.contains("Tomatoes"), "got: {}", d.reason);
        assert!(d.reason.contains("20.0"), "got: {}", d.reason);
    }

    #[test]
    fn classifier_confidence_is_full() {
        assert_eq!(classify(50.0, &tomatoes()).confidence, 100.0);
    }
}
