// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity summary as seen by the annotation pipeline.

use serde::Deserialize;

/// Sport types that count toward the cycling goal.
pub const CYCLING_SPORT_TYPES: &[&str] = &[
    "Ride",
    "VirtualRide",
    "GravelRide",
    "MountainBikeRide",
    "EBikeRide",
    "EMountainBikeRide",
    "Velomobile",
    "Handcycle",
];

/// Returns true if the sport type is on the cycling allow-list.
pub fn is_cycling(sport_type: &str) -> bool {
    CYCLING_SPORT_TYPES.contains(&sport_type)
}

/// Activity entry from the athlete activity listing.
///
/// Rebuilt from Strava on every pipeline run and never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    /// Sport type (Ride, Run, VirtualRide, etc.)
    #[serde(rename = "sport_type", alias = "category")]
    pub sport_type: String,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Only present when Strava includes it in the listing
    #[serde(default)]
    pub description: Option<String>,
}

impl ActivitySummary {
    pub fn is_cycling(&self) -> bool {
        is_cycling(&self.sport_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycling_allow_list() {
        assert!(is_cycling("Ride"));
        assert!(is_cycling("VirtualRide"));
        assert!(is_cycling("GravelRide"));
        assert!(!is_cycling("Run"));
        assert!(!is_cycling("ride"));
        assert!(!is_cycling(""));
    }

    #[test]
    fn test_decode_listing_entry() {
        let json = r#"{"id": 99, "name": "Lunch Ride", "sport_type": "Ride", "distance": 12345.6}"#;
        let summary: ActivitySummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.id, 99);
        assert!(summary.is_cycling());
        assert_eq!(summary.distance, 12345.6);
        assert!(summary.description.is_none());
    }

    #[test]
    fn test_decode_category_alias() {
        let json = r#"{"id": 7, "category": "Run", "distance": 5000.0, "description": "easy"}"#;
        let summary: ActivitySummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.sport_type, "Run");
        assert!(!summary.is_cycling());
        assert_eq!(summary.description.as_deref(), Some("easy"));
    }
}
