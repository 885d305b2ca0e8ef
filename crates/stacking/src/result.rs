//! Outcomes of manager operations.

use crate::item::{Item, PlacedPallet};
use crate::movement::MovementSummary;
use std::collections::BTreeMap;
use u_asrs_core::{Location, PalletId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of a successful offline reorganization.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReorganizeReport {
    /// New location of every stored pallet.
    pub locations: BTreeMap<PalletId, Location>,

    /// Travel caused by moving pallets from their old to their new location.
    pub movement: MovementSummary,

    /// Number of pallets that ended where they started.
    pub unchanged: usize,
}

impl ReorganizeReport {
    /// Returns the number of pallets repacked.
    pub fn pallet_count(&self) -> usize {
        self.locations.len()
    }

    /// Returns the new location of a pallet.
    pub fn location(&self, id: PalletId) -> Option<&Location> {
        self.locations.get(&id)
    }
}

/// Result of removing an item.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Removal {
    /// The emptied pallet, as re-seated in a pallet bin.
    pub pallet: PlacedPallet,

    /// The item that was unloaded.
    pub cargo: Item,

    /// Pallets that moved down to close the gap left behind.
    pub shifted: Vec<PalletId>,
}
