//! # U-ASRS Core
//!
//! Core types for the U-ASRS storage allocator.
//!
//! This crate provides the pieces shared by the online planner, the offline
//! reorganizer and the manager in `u-asrs-stacking`.
//!
//! ## Core Components
//!
//! - **Geometry utilities**: `adjusted_height`, `optimal_orientation`
//! - **Locations**: `BinId`, `PalletId`, `Position`, `Location`, `Entrance`
//! - **Placement plans**: `PlacementPlan` and its completeness-checked builder
//! - **Errors**: the classified `Error` taxonomy
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod error;
pub mod geometry;
pub mod placement;

// Re-exports
pub use error::{Error, RemovalFailure, Result};
pub use geometry::{
    adjusted_height, footprint_fits, optimal_orientation, Dimensions, ItemId, RotationConstraint,
    EPSILON,
};
pub use placement::{
    stack_position, BinId, Entrance, Location, PalletId, PlacementPlan, PlacementPlanBuilder,
    Position,
};
