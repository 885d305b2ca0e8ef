//! Geometry utilities: orientation search and height quantization.
//!
//! All vectors use the storage-column convention: x = width, y = height
//! (vertical, the stacking axis), z = depth.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of an arriving item, as supplied by the external feed.
pub type ItemId = String;

/// Box dimensions (width, height, depth).
pub type Dimensions = Vector3<f64>;

/// Tolerance used for all capacity comparisons.
pub const EPSILON: f64 = 1e-9;

/// The six axis permutations of (width, height, depth), in enumeration order.
const PERMUTATIONS: [(usize, usize, usize); 6] = [
    (0, 1, 2),
    (0, 2, 1),
    (1, 0, 2),
    (1, 2, 0),
    (2, 0, 1),
    (2, 1, 0),
];

/// Rotation capability of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RotationConstraint {
    /// Upright only: nominal layout or a quarter turn about the vertical axis.
    #[default]
    Fixed,
    /// Any of the six axis-aligned orientations.
    Free,
}

impl RotationConstraint {
    /// Maps the feed's `can_rotate` flag.
    pub fn from_flag(can_rotate: bool) -> Self {
        if can_rotate {
            RotationConstraint::Free
        } else {
            RotationConstraint::Fixed
        }
    }
}

#[inline]
fn fits(value: f64, limit: f64) -> bool {
    value <= limit + EPSILON
}

/// Returns true if a (width, depth) footprint fits inside the bin footprint as laid out.
#[inline]
pub fn footprint_fits(dimensions: &Dimensions, bin: &Dimensions) -> bool {
    fits(dimensions.x, bin.x) && fits(dimensions.z, bin.z)
}

/// Rounds `height` up to the nearest multiple of `granularity`.
///
/// Returns `height` unchanged when `granularity <= 0`. Values within
/// [`EPSILON`] of a multiple snap to it, but never below `height`, so the
/// result is always `>= height` and the function stays idempotent under
/// floating-point division.
pub fn adjusted_height(height: f64, granularity: f64) -> f64 {
    if granularity <= 0.0 {
        return height;
    }
    let steps = height / granularity;
    let nearest = steps.round();
    let snapped = if (steps - nearest).abs() < EPSILON {
        nearest * granularity
    } else {
        steps.ceil() * granularity
    };
    snapped.max(height)
}

/// Selects the orientation with the lowest height whose footprint fits the bin.
///
/// Fixed items try the nominal layout and then the quarter turn `(d, h, w)`.
/// Free items try all six permutations; each accepted permutation is laid out
/// so its footprint matches the bin (swapping width and depth when needed) and
/// the one with the smallest height wins, ties going to the earliest
/// permutation.
pub fn optimal_orientation(
    nominal: &Dimensions,
    rotation: RotationConstraint,
    bin: &Dimensions,
) -> Option<Dimensions> {
    match rotation {
        RotationConstraint::Fixed => {
            if footprint_fits(nominal, bin) {
                Some(*nominal)
            } else {
                let turned = Dimensions::new(nominal.z, nominal.y, nominal.x);
                footprint_fits(&turned, bin).then_some(turned)
            }
        }
        RotationConstraint::Free => {
            let mut best: Option<Dimensions> = None;
            for (a, b, c) in PERMUTATIONS {
                let candidate = Dimensions::new(nominal[a], nominal[b], nominal[c]);
                let laid_out = if footprint_fits(&candidate, bin) {
                    candidate
                } else {
                    let turned = Dimensions::new(candidate.z, candidate.y, candidate.x);
                    if !footprint_fits(&turned, bin) {
                        continue;
                    }
                    turned
                };
                if best.map_or(true, |current| laid_out.y < current.y) {
                    best = Some(laid_out);
                }
            }
            best
        }
    }
}

/// Validates that every component is strictly positive and finite.
pub fn is_positive(dimensions: &Dimensions) -> bool {
    dimensions.iter().all(|v| v.is_finite() && *v > 0.0)
}
