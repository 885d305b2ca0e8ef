//! Carrier travel accounting.
//!
//! Moving between columns costs one bin width per column crossed; moving
//! along a column costs the vertical distance.

use u_asrs_core::Location;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns the travel distance between two locations:
/// `bin_width * |from.bin - to.bin| + |from.y - to.y|`.
pub fn travel_distance(from: &Location, to: &Location, bin_width: f64) -> f64 {
    bin_width * f64::from(from.bin.abs_diff(to.bin)) + (from.height() - to.height()).abs()
}

/// Accumulated carrier travel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MovementSummary {
    /// Number of moves that changed location.
    pub moved: usize,
    /// Distance travelled across columns.
    pub horizontal: f64,
    /// Distance travelled along columns.
    pub vertical: f64,
}

impl MovementSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one move. Moves that end where they started are not counted.
    pub fn record(&mut self, from: &Location, to: &Location, bin_width: f64) {
        let horizontal = bin_width * f64::from(from.bin.abs_diff(to.bin));
        let vertical = (from.height() - to.height()).abs();
        if horizontal + vertical <= u_asrs_core::EPSILON {
            return;
        }
        self.moved += 1;
        self.horizontal += horizontal;
        self.vertical += vertical;
    }

    /// Returns the total travel distance.
    pub fn total(&self) -> f64 {
        self.horizontal + self.vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use u_asrs_core::stack_position;

    #[test]
    fn test_travel_distance() {
        let from = Location::new(5, stack_position(50.0));
        let to = Location::new(2, stack_position(20.0));
        assert_relative_eq!(travel_distance(&from, &to, 100.0), 330.0);
        assert_relative_eq!(travel_distance(&to, &from, 100.0), 330.0);
        assert_relative_eq!(travel_distance(&from, &from, 100.0), 0.0);
    }

    #[test]
    fn test_summary_skips_stationary_moves() {
        let a = Location::new(1, stack_position(0.0));
        let b = Location::new(3, stack_position(15.0));

        let mut summary = MovementSummary::new();
        summary.record(&a, &a, 100.0);
        summary.record(&a, &b, 100.0);
        summary.record(&b, &a, 100.0);

        assert_eq!(summary.moved, 2);
        assert_relative_eq!(summary.horizontal, 400.0);
        assert_relative_eq!(summary.vertical, 30.0);
        assert_relative_eq!(summary.total(), 430.0);
    }
}
