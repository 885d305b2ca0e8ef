//! Locations and placement plans.

use crate::error::{Error, Result};
use crate::geometry::Dimensions;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a storage column.
pub type BinId = u32;

/// Identifier of a pallet; stable across empty and loaded states.
pub type PalletId = u32;

/// Origin coordinates of a placed pallet (x, y = stack height, z).
pub type Position = Vector3<f64>;

/// Creates the position of a stack entry at the given height.
#[inline]
pub fn stack_position(height: f64) -> Position {
    Position::new(0.0, height, 0.0)
}

/// A position inside a specific bin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Owning bin.
    pub bin: BinId,
    /// Origin inside the bin.
    pub position: Position,
}

impl Location {
    /// Creates a new location.
    pub fn new(bin: BinId, position: Position) -> Self {
        Self { bin, position }
    }

    /// Returns the stack height of this location.
    pub fn height(&self) -> f64 {
        self.position.y
    }
}

/// Reference point for distance queries: the column and height where
/// carriers enter and leave the system.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entrance {
    /// Column index of the entrance.
    pub bin: BinId,
    /// Vertical position of the entrance.
    pub height: f64,
}

impl Entrance {
    /// Creates a new entrance reference.
    pub fn new(bin: BinId, height: f64) -> Self {
        Self { bin, height }
    }

    /// Returns the entrance as a location.
    pub fn location(&self) -> Location {
        Location::new(self.bin, stack_position(self.height))
    }
}

/// An immutable, validated pallet exchange: take the empty pallet at `source`,
/// load it, and put it at `target` with the given oriented dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementPlan {
    pallet_id: PalletId,
    source: Location,
    target: Location,
    dimensions: Dimensions,
}

impl PlacementPlan {
    /// Returns the exchanged pallet's id.
    pub fn pallet_id(&self) -> PalletId {
        self.pallet_id
    }

    /// Returns where the pallet was picked up.
    pub fn source(&self) -> Location {
        self.source
    }

    /// Returns where the loaded pallet goes.
    pub fn target(&self) -> Location {
        self.target
    }

    /// Returns the oriented dimensions reserved at the target.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns true if the pallet stays in its own column.
    pub fn is_same_bin(&self) -> bool {
        self.source.bin == self.target.bin
    }
}

/// Accumulates the parts of a [`PlacementPlan`] while a planner decides.
#[derive(Debug, Clone, Default)]
pub struct PlacementPlanBuilder {
    pallet_id: Option<PalletId>,
    source: Option<Location>,
    target: Option<Location>,
    dimensions: Option<Dimensions>,
}

impl PlacementPlanBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pallet and its current location.
    pub fn with_pallet(mut self, id: PalletId, source: Location) -> Self {
        self.pallet_id = Some(id);
        self.source = Some(source);
        self
    }

    /// Sets the target location.
    pub fn with_target(mut self, target: Location) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the oriented dimensions.
    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Validates completeness and freezes the plan.
    pub fn build(self) -> Result<PlacementPlan> {
        Ok(PlacementPlan {
            pallet_id: self
                .pallet_id
                .ok_or(Error::PlacementPlanIncomplete("pallet id"))?,
            source: self
                .source
                .ok_or(Error::PlacementPlanIncomplete("source location"))?,
            target: self
                .target
                .ok_or(Error::PlacementPlanIncomplete("target location"))?,
            dimensions: self
                .dimensions
                .ok_or(Error::PlacementPlanIncomplete("dimensions"))?,
        })
    }
}
