//! Per-user distance goal.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user's yearly distance goal, stored keyed by athlete ID.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GoalSetting {
    pub athlete_id: u64,
    /// Goal distance for the calendar year, in meters
    #[validate(range(exclusive_min = 0.0))]
    pub goal_distance_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_goal_is_valid() {
        let goal = GoalSetting {
            athlete_id: 1,
            goal_distance_meters: 3_000_000.0,
        };
        assert!(goal.validate().is_ok());
    }

    #[test]
    fn test_zero_goal_is_invalid() {
        let goal = GoalSetting {
            athlete_id: 1,
            goal_distance_meters: 0.0,
        };
        assert!(goal.validate().is_err());
    }
}
