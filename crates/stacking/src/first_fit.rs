//! Online First-Fit placement.
//!
//! Two planners share the same scan: walk the priority list and take the
//! first bin that accepts the load.
//!
//! - [`FirstFit`] places a pallet directly (seeding, re-seating freed pallets).
//! - [`PalletExchange`] plans loading an arriving item onto an empty pallet
//!   and moving it to a target bin, without touching any state.

use crate::bin::{BinMap, Fit};
use crate::item::{Item, Pallet, PlacedPallet};
use u_asrs_core::{
    optimal_orientation, BinId, Dimensions, Error, Location, PlacementPlanBuilder, Result,
};

/// Places pallets into the first bin, in priority order, with room for them.
#[derive(Debug, Clone, Copy)]
pub struct FirstFit<'a> {
    priority: &'a [BinId],
}

impl<'a> FirstFit<'a> {
    /// Creates a planner over the given priority list.
    pub fn new(priority: &'a [BinId]) -> Self {
        Self { priority }
    }

    /// Finds the first bin that accepts `pallet`.
    ///
    /// Fails with [`Error::Dimension`] if no candidate footprint admits any
    /// orientation, and with [`Error::Capacity`] if the footprint fits
    /// somewhere but height or weight budgets are exhausted.
    pub fn find(&self, pallet: &Pallet, bins: &BinMap) -> Result<Fit> {
        let mut footprint_fits = false;

        for bin_id in self.priority {
            let Some(bin) = bins.get(bin_id) else {
                log::warn!("Priority list references unknown bin {}", bin_id);
                continue;
            };

            let orientation =
                optimal_orientation(pallet.dimensions(), pallet.rotation(), bin.dimensions());
            if orientation.is_none() {
                continue;
            }
            footprint_fits = true;

            if !bin.accepts_weight(pallet.weight()) {
                continue;
            }

            if let Some(fit) = bin.can_place_pallet(pallet) {
                return Ok(fit);
            }
        }

        if footprint_fits {
            Err(Error::Capacity(pallet.label()))
        } else {
            Err(Error::Dimension(pallet.label()))
        }
    }

    /// Places `pallet` into the first bin with room and returns its location.
    /// On failure the bins are unchanged.
    pub fn place(&self, pallet: Pallet, bins: &mut BinMap) -> Result<Location> {
        let fit = self.find(&pallet, bins)?;
        let bin = bins
            .get_mut(&fit.bin())
            .ok_or_else(|| Error::Internal(format!("bin {} vanished", fit.bin())))?;
        let placed = bin.place(pallet, fit)?;
        log::debug!(
            "First fit placed pallet {} in bin {} at height {}",
            placed.id(),
            placed.bin(),
            placed.position().y
        );
        Ok(placed.location())
    }
}

/// Plans pallet exchanges for arriving items.
#[derive(Debug, Clone, Copy)]
pub struct PalletExchange<'a> {
    priority: &'a [BinId],
    template: &'a Dimensions,
}

impl<'a> PalletExchange<'a> {
    /// Creates a planner over the online priority list and the shared bin dimensions.
    pub fn new(priority: &'a [BinId], template: &'a Dimensions) -> Self {
        Self { priority, template }
    }

    /// Plans loading `item` onto `pallet` and moving it to the first bin with
    /// room. The pallet's own bin is judged as if the pallet were already gone.
    ///
    /// The returned builder still has to pass [`PlacementPlanBuilder::build`].
    pub fn plan(
        &self,
        item: &Item,
        pallet: Option<&PlacedPallet>,
        bins: &BinMap,
    ) -> Result<PlacementPlanBuilder> {
        if item.optimal_orientation(self.template).is_none() {
            return Err(Error::Dimension(item.id().clone()));
        }

        let pallet = pallet.ok_or(Error::PalletUnavailable)?;
        if !pallet.is_empty() {
            return Err(Error::Internal(format!(
                "pallet {} selected for exchange is loaded",
                pallet.id()
            )));
        }

        for bin_id in self.priority {
            let Some(bin) = bins.get(bin_id) else {
                log::warn!("Priority list references unknown bin {}", bin_id);
                continue;
            };

            if !bin.accepts_weight(item.weight()) {
                continue;
            }

            let fit = if *bin_id == pallet.bin() {
                bin.can_place_excluding(item.dimensions(), item.rotation(), pallet.id())
            } else {
                bin.can_place(item.dimensions(), item.rotation())
            };

            if let Some(fit) = fit {
                log::debug!(
                    "Planned exchange of pallet {} for '{}': bin {} -> bin {} at height {}",
                    pallet.id(),
                    item.id(),
                    pallet.bin(),
                    bin_id,
                    fit.position().y
                );
                return Ok(PlacementPlanBuilder::new()
                    .with_pallet(pallet.id(), pallet.location())
                    .with_target(Location::new(*bin_id, *fit.position()))
                    .with_dimensions(*fit.dimensions()));
            }
        }

        Err(Error::Capacity(item.id().clone()))
    }
}
