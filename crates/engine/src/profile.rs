//! Crop moisture profiles and the registry that resolves them by name.
//!
//! A profile is the four-bound moisture envelope (`min < optimal_min <
//! optimal_max < max`, all percentages) defining the watering bands for one
//! crop.  The registry falls back to a configurable default profile when a
//! reading carries an unknown crop name, so a mislabelled field never stops
//! the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub min: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub max: f64,
}

impl CropProfile {
    pub fn new(name: &str, min: f64, optimal_min: f64, optimal_max: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            optimal_min,
            optimal_max,
            max,
        }
    }

    /// Check the band-ordering invariant.
    pub fn is_ordered(&self) -> bool {
        self.min < self.optimal_min
            && self.optimal_min < self.optimal_max
            && self.optimal_max < self.max
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CropRegistry {
    profiles: HashMap<String, CropProfile>,
    default_crop: String,
}

impl CropRegistry {
    /// Build a registry from a profile list.  The caller (config validation)
    /// has already checked ordering and that `default_crop` exists.
    pub fn new(profiles: Vec<CropProfile>, default_crop: &str) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.name.clone(), p)).collect(),
            default_crop: default_crop.to_string(),
        }
    }

    /// Look up a profile by crop name.  Returns the profile and whether the
    /// name was actually known; unknown names resolve to the default profile.
    pub fn resolve(&self, crop: &str) -> (&CropProfile, bool) {
        match self.profiles.get(crop) {
            Some(p) => (p, true),
            None => (
                self.profiles
                    .get(&self.default_crop)
                    .expect("default crop always registered"),
                false,
            ),
        }
    }

    pub fn default_crop(&self) -> &str {
        &self.default_crop
    }

    /// All registered profiles, in no particular order.
    pub fn profiles_vec(&self) -> Vec<CropProfile> {
        self.profiles.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for CropRegistry {
    /// Built-in registry with the three field crops the system ships with.
    fn default() -> Self {
        Self::new(
            vec![
                CropProfile::new("Tomatoes", 35.0, 45.0, 65.0, 75.0),
                CropProfile::new("Onions", 30.0, 40.0, 55.0, 70.0),
                CropProfile::new("Mint", 40.0, 50.0, 70.0, 80.0),
            ],
            "Tomatoes",
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -- CropProfile ---------------------------------------------------------

    #[test]
    fn ordered_profile_passes() {
        assert!(CropProfile::new("x", 10.0, 20.0, 30.0, 40.0).is_ordered());
    }

    #[test]
    fn equal_bounds_not_ordered() {
        assert!(!CropProfile::new("x", 10.0, 10.0, 30.0, 40.0).is_ordered());
    }

    #[test]
    fn inverted_bounds_not_ordered() {
        assert!(!CropProfile::new("x", 40.0, 30.0, 20.0, 10.0).is_ordered());
    }

    #[test]
    fn builtin_profiles_are_ordered() {
        let registry = CropRegistry::default();
        for crop in ["Tomatoes", "Onions", "Mint"] {
            let (p, known) = registry.resolve(crop);
            assert!(known, "{crop} should be registered");
            assert!(p.is_ordered(), "{crop} bounds out of order");
        }
    }

    // -- CropRegistry --------------------------------------------------------

    #[test]
    fn resolve_known_crop() {
        let registry = CropRegistry::default();
        let (p, known) = registry.resolve("Onions");
        assert!(known);
        assert_eq!(p.name, "Onions");
        assert_eq!(p.min, 30.0);
        assert_eq!(p.max, 70.0);
    }

    #[test]
    fn resolve_unknown_crop_falls_back_to_default() {
        let registry = CropRegistry::default();
        let (p, known) = registry.resolve("Cactus");
        assert!(!known);
        assert_eq!(p.name, "Tomatoes");
    }

    #[test]
    fn custom_default_crop() {
        let registry = CropRegistry::new(
            vec![
                CropProfile::new("Mint", 40.0, 50.0, 70.0, 80.0),
                CropProfile::new("Basil", 38.0, 48.0, 68.0, 78.0),
            ],
            "Basil",
        );
        let (p, known) = registry.resolve("nope");
        assert!(!known);
        assert_eq!(p.name, "Basil");
    }
}
