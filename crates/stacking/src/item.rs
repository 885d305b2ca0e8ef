//! Items, pallets and placed pallets.

use u_asrs_core::geometry::{is_positive, optimal_orientation};
use u_asrs_core::{
    BinId, Dimensions, Error, ItemId, Location, PalletId, Position, Result, RotationConstraint,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An arriving item, described by its nominal (pre-orientation) dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Identifier from the external feed.
    id: ItemId,

    /// Nominal dimensions (width, height, depth).
    dimensions: Dimensions,

    /// Whether the item may be reoriented.
    rotation: RotationConstraint,

    /// Weight, checked against bin weight limits.
    weight: Option<f64>,
}

impl Item {
    /// Creates a new fixed-orientation item.
    pub fn new(id: impl Into<ItemId>, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id: id.into(),
            dimensions: Dimensions::new(width, height, depth),
            rotation: RotationConstraint::Fixed,
            weight: None,
        }
    }

    /// Sets the rotation constraint.
    pub fn with_rotation(mut self, rotation: RotationConstraint) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Returns the feed identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the nominal dimensions.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns the rotation constraint.
    pub fn rotation(&self) -> RotationConstraint {
        self.rotation
    }

    /// Returns the weight.
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Returns the lowest orientation whose footprint fits `bin`.
    pub fn optimal_orientation(&self, bin: &Dimensions) -> Option<Dimensions> {
        optimal_orientation(&self.dimensions, self.rotation, bin)
    }

    /// Validates dimensions and weight.
    pub fn validate(&self) -> Result<()> {
        if !is_positive(&self.dimensions) {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for '{}' must be positive",
                self.id
            )));
        }

        if let Some(weight) = self.weight {
            if weight.is_nan() || weight < 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "Weight for '{}' cannot be negative",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

/// Returns the nominal dimensions of an empty carrier for a bin template:
/// half the bin footprint and one granularity step tall.
pub fn carrier_dimensions(bin: &Dimensions, granularity: f64) -> Dimensions {
    Dimensions::new(bin.x / 2.0, granularity, bin.z / 2.0)
}

/// A reusable carrier that alternates between empty and loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pallet {
    /// An unloaded carrier.
    Empty {
        /// Pallet identity.
        id: PalletId,
        /// Carrier dimensions.
        dimensions: Dimensions,
    },
    /// A carrier holding an item.
    Loaded {
        /// Pallet identity.
        id: PalletId,
        /// Cargo.
        item: Item,
    },
}

impl Pallet {
    /// Creates an empty pallet.
    pub fn empty(id: PalletId, dimensions: Dimensions) -> Self {
        Pallet::Empty { id, dimensions }
    }

    /// Loads `item`, keeping the pallet identity.
    pub fn load(self, item: Item) -> Result<Pallet> {
        match self {
            Pallet::Empty { id, .. } => Ok(Pallet::Loaded { id, item }),
            Pallet::Loaded { id, .. } => Err(Error::Internal(format!(
                "pallet {} is already loaded",
                id
            ))),
        }
    }

    /// Unloads the cargo, returning the empty pallet and the item it carried.
    pub fn unload(self, carrier: Dimensions) -> (Pallet, Option<Item>) {
        match self {
            Pallet::Empty { id, .. } => (Pallet::empty(id, carrier), None),
            Pallet::Loaded { id, item } => (Pallet::empty(id, carrier), Some(item)),
        }
    }

    /// Returns the pallet id.
    pub fn id(&self) -> PalletId {
        match self {
            Pallet::Empty { id, .. } | Pallet::Loaded { id, .. } => *id,
        }
    }

    /// Returns true if the pallet carries nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Pallet::Empty { .. })
    }

    /// Returns the cargo, if any.
    pub fn item(&self) -> Option<&Item> {
        match self {
            Pallet::Empty { .. } => None,
            Pallet::Loaded { item, .. } => Some(item),
        }
    }

    /// Returns the nominal dimensions of what occupies the slot.
    pub fn dimensions(&self) -> &Dimensions {
        match self {
            Pallet::Empty { dimensions, .. } => dimensions,
            Pallet::Loaded { item, .. } => item.dimensions(),
        }
    }

    /// Returns the rotation constraint. Empty carriers never tip over.
    pub fn rotation(&self) -> RotationConstraint {
        match self {
            Pallet::Empty { .. } => RotationConstraint::Fixed,
            Pallet::Loaded { item, .. } => item.rotation(),
        }
    }

    /// Returns the weight of the cargo.
    pub fn weight(&self) -> Option<f64> {
        self.item().and_then(Item::weight)
    }

    /// Returns a label for diagnostics: the cargo id, or `pallet-<id>`.
    pub fn label(&self) -> ItemId {
        match self {
            Pallet::Empty { id, .. } => format!("pallet-{}", id),
            Pallet::Loaded { item, .. } => item.id().clone(),
        }
    }
}

/// A pallet stored in a bin. Only bins create these, so the owning bin,
/// position and reserved dimensions are always set together.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedPallet {
    pallet: Pallet,
    bin: BinId,
    position: Position,
    placed_dimensions: Dimensions,
}

impl PlacedPallet {
    pub(crate) fn new(
        pallet: Pallet,
        bin: BinId,
        position: Position,
        placed_dimensions: Dimensions,
    ) -> Self {
        Self {
            pallet,
            bin,
            position,
            placed_dimensions,
        }
    }

    /// Returns the pallet.
    pub fn pallet(&self) -> &Pallet {
        &self.pallet
    }

    /// Returns the pallet id.
    pub fn id(&self) -> PalletId {
        self.pallet.id()
    }

    /// Returns true if the pallet is empty.
    pub fn is_empty(&self) -> bool {
        self.pallet.is_empty()
    }

    /// Returns the owning bin.
    pub fn bin(&self) -> BinId {
        self.bin
    }

    /// Returns the origin inside the bin.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the owning bin and position.
    pub fn location(&self) -> Location {
        Location::new(self.bin, self.position)
    }

    /// Returns the oriented dimensions reserved in the bin.
    pub fn placed_dimensions(&self) -> &Dimensions {
        &self.placed_dimensions
    }

    /// Takes the pallet out, dropping its placement.
    pub fn into_pallet(self) -> Pallet {
        self.pallet
    }

    pub(crate) fn shift_down(&mut self, by: f64) {
        self.position.y -= by;
    }
}
