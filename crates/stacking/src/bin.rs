//! Storage columns.
//!
//! A bin holds a single bottom-up stack: every pallet sits at `(0, y, 0)` and
//! reserves its oriented footprint plus its adjusted height. Heights are kept
//! gap-free; withdrawing a pallet shifts everything above it down.

use crate::item::{Pallet, PlacedPallet};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use u_asrs_core::geometry::{adjusted_height, footprint_fits, optimal_orientation, EPSILON};
use u_asrs_core::{
    stack_position, BinId, Dimensions, Error, PalletId, Position, Result, RotationConstraint,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bins of a system, keyed and iterated by id.
pub type BinMap = BTreeMap<BinId, Bin>;

/// Shared dimensions and limits of every bin in a system.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinTemplate {
    /// Capacity (width, height, depth).
    pub dimensions: Dimensions,
    /// Quantization step of the shelf.
    pub granularity: f64,
    /// Per-item weight limit.
    pub weight_limit: Option<f64>,
}

impl BinTemplate {
    /// Creates a template without weight limit.
    pub fn new(width: f64, height: f64, depth: f64, granularity: f64) -> Self {
        Self {
            dimensions: Dimensions::new(width, height, depth),
            granularity,
            weight_limit: None,
        }
    }

    /// Sets the per-item weight limit.
    pub fn with_weight_limit(mut self, limit: f64) -> Self {
        self.weight_limit = Some(limit);
        self
    }

    /// Creates an empty bin with this template.
    pub fn build(&self, id: BinId) -> Bin {
        let bin = Bin::new(id, self.dimensions.x, self.dimensions.y, self.dimensions.z)
            .with_granularity(self.granularity);
        match self.weight_limit {
            Some(limit) => bin.with_weight_limit(limit),
            None => bin,
        }
    }

    /// Validates the template.
    pub fn validate(&self) -> Result<()> {
        if !u_asrs_core::geometry::is_positive(&self.dimensions) {
            return Err(Error::Config("All bin dimensions must be positive".into()));
        }
        if !(self.granularity.is_finite() && self.granularity > 0.0) {
            return Err(Error::Config(
                "Minimum adjustment length must be positive".into(),
            ));
        }
        if let Some(limit) = self.weight_limit {
            if limit.is_nan() || limit <= 0.0 {
                return Err(Error::Config("Weight limit must be positive".into()));
            }
        }
        Ok(())
    }
}

/// Proof that a bin accepted a pallet: the oriented dimensions and the stack
/// position it will occupy. Only a bin's own checks create one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    bin: BinId,
    position: Position,
    dimensions: Dimensions,
    top: f64,
}

impl Fit {
    /// Returns the bin that issued this fit.
    pub fn bin(&self) -> BinId {
        self.bin
    }

    /// Returns the stack position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the chosen orientation.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns the bin height after placement.
    pub fn top(&self) -> f64 {
        self.top
    }
}

/// Result of withdrawing a pallet from a bin.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    /// The pallet as it was stored.
    pub placed: PlacedPallet,
    /// Pallets that moved down to close the gap.
    pub shifted: Vec<PalletId>,
}

/// A single storage column.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bin {
    /// Unique identifier.
    id: BinId,

    /// Capacity (width, height, depth).
    dimensions: Dimensions,

    /// Shelf quantization step ("min adjustment length").
    granularity: f64,

    /// Per-item weight limit.
    weight_limit: Option<f64>,

    /// Stored pallets by id.
    contents: BTreeMap<PalletId, PlacedPallet>,
}

impl Bin {
    /// Creates an empty bin without quantization.
    pub fn new(id: BinId, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id,
            dimensions: Dimensions::new(width, height, depth),
            granularity: 0.0,
            weight_limit: None,
            contents: BTreeMap::new(),
        }
    }

    /// Sets the quantization step.
    pub fn with_granularity(mut self, granularity: f64) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets the per-item weight limit.
    pub fn with_weight_limit(mut self, limit: f64) -> Self {
        self.weight_limit = Some(limit);
        self
    }

    /// Returns the bin id.
    pub fn id(&self) -> BinId {
        self.id
    }

    /// Returns the dimensions (width, height, depth).
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.dimensions.x
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.dimensions.y
    }

    /// Returns the depth.
    pub fn depth(&self) -> f64 {
        self.dimensions.z
    }

    /// Returns the quantization step.
    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    /// Returns the per-item weight limit.
    pub fn weight_limit(&self) -> Option<f64> {
        self.weight_limit
    }

    /// Rounds a height up to this bin's shelf step.
    pub fn adjusted(&self, height: f64) -> f64 {
        adjusted_height(height, self.granularity)
    }

    /// Returns the next free stacking height: 0 when empty, otherwise the
    /// highest `position.y + adjusted(placed height)`.
    pub fn current_height(&self) -> f64 {
        self.contents
            .values()
            .map(|p| p.position().y + self.adjusted(p.placed_dimensions().y))
            .fold(0.0, f64::max)
    }

    /// Returns the height still available on top of the stack.
    pub fn remaining_height(&self) -> f64 {
        (self.height() - self.current_height()).max(0.0)
    }

    /// Returns the used share of the bin height (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        self.current_height() / self.height()
    }

    /// Returns true if an item of `weight` may enter this bin. Equality is accepted.
    pub fn accepts_weight(&self, weight: Option<f64>) -> bool {
        match (self.weight_limit, weight) {
            (Some(limit), Some(weight)) => weight <= limit + EPSILON,
            _ => true,
        }
    }

    fn fit_on(&self, oriented: Dimensions, base: f64) -> Option<Fit> {
        if !footprint_fits(&oriented, &self.dimensions) {
            return None;
        }
        let top = base + self.adjusted(oriented.y);
        (top <= self.height() + EPSILON).then(|| Fit {
            bin: self.id,
            position: stack_position(base),
            dimensions: oriented,
            top,
        })
    }

    /// Checks whether an item fits on top of the stack.
    ///
    /// Returns the chosen orientation and position instead of recording them
    /// anywhere, so a failed check leaves no trace.
    pub fn can_place(&self, nominal: &Dimensions, rotation: RotationConstraint) -> Option<Fit> {
        let oriented = optimal_orientation(nominal, rotation, &self.dimensions)?;
        self.fit_on(oriented, self.current_height())
    }

    /// Checks whether a pallet fits on top of the stack.
    pub fn can_place_pallet(&self, pallet: &Pallet) -> Option<Fit> {
        self.can_place(pallet.dimensions(), pallet.rotation())
    }

    /// Like [`can_place`](Self::can_place), but against the stack as it would
    /// be after withdrawing `excluded`.
    pub fn can_place_excluding(
        &self,
        nominal: &Dimensions,
        rotation: RotationConstraint,
        excluded: PalletId,
    ) -> Option<Fit> {
        let oriented = optimal_orientation(nominal, rotation, &self.dimensions)?;
        self.fit_on(oriented, self.height_without(excluded))
    }

    /// Re-validates a planned placement: `position` must be the current top of
    /// the stack and the oriented box must still fit.
    pub fn fit_at(&self, oriented: &Dimensions, position: &Position) -> Option<Fit> {
        let base = self.current_height();
        if (position.y - base).abs() > EPSILON {
            return None;
        }
        self.fit_on(*oriented, base)
    }

    /// Returns the stack height after withdrawing `excluded` and closing the gap.
    pub fn height_without(&self, excluded: PalletId) -> f64 {
        let Some(removed) = self.contents.get(&excluded) else {
            return self.current_height();
        };
        let band = self.adjusted(removed.placed_dimensions().y);
        let band_top = removed.position().y + band;

        self.contents
            .values()
            .filter(|p| p.id() != excluded)
            .map(|p| {
                let y = if p.position().y >= band_top - EPSILON {
                    p.position().y - band
                } else {
                    p.position().y
                };
                y + self.adjusted(p.placed_dimensions().y)
            })
            .fold(0.0, f64::max)
    }

    /// Places a pallet according to a fit issued by this bin.
    ///
    /// Fails with [`Error::Internal`] if a pallet with the same id is already
    /// stored here; the bin is left unchanged.
    pub fn place(&mut self, pallet: Pallet, fit: Fit) -> Result<&PlacedPallet> {
        debug_assert_eq!(fit.bin, self.id, "fit issued by another bin");
        debug_assert!(
            (fit.position.y - self.current_height()).abs() <= EPSILON,
            "stale fit"
        );

        let id = pallet.id();
        match self.contents.entry(id) {
            Entry::Occupied(_) => Err(Error::Internal(format!(
                "pallet {} is already stored in bin {}",
                id, self.id
            ))),
            Entry::Vacant(slot) => Ok(slot.insert(PlacedPallet::new(
                pallet,
                self.id,
                fit.position,
                fit.dimensions,
            ))),
        }
    }

    /// Removes a pallet and shifts every pallet stacked above it down by the
    /// removed pallet's adjusted height.
    pub fn withdraw(&mut self, id: PalletId) -> Option<Withdrawal> {
        let placed = self.contents.remove(&id)?;
        let band = self.adjusted(placed.placed_dimensions().y);
        let band_top = placed.position().y + band;

        let mut shifted = Vec::new();
        for above in self
            .contents
            .values_mut()
            .filter(|p| p.position().y >= band_top - EPSILON)
        {
            above.shift_down(band);
            shifted.push(above.id());
        }

        Some(Withdrawal { placed, shifted })
    }

    /// Returns a stored pallet.
    pub fn get(&self, id: PalletId) -> Option<&PlacedPallet> {
        self.contents.get(&id)
    }

    /// Returns true if the bin stores the pallet.
    pub fn contains(&self, id: PalletId) -> bool {
        self.contents.contains_key(&id)
    }

    /// Iterates stored pallets in id order.
    pub fn pallets(&self) -> impl Iterator<Item = &PlacedPallet> {
        self.contents.values()
    }

    /// Returns the number of stored pallets.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Returns true if the bin is empty.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Removes and returns every stored pallet in id order.
    pub fn drain(&mut self) -> Vec<PlacedPallet> {
        std::mem::take(&mut self.contents).into_values().collect()
    }

    /// Clears all contents.
    pub fn reset(&mut self) {
        self.contents.clear();
    }
}
