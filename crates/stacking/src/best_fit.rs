//! Offline Best-Fit reorganization.
//!
//! Every stored pallet is reoriented against the shared bin template, sorted
//! by oriented height (tallest first) and dropped into the bin that leaves the
//! least head room. Ties go to the earlier bin in the offline priority list.

use crate::bin::{BinMap, Fit};
use crate::item::{Pallet, PlacedPallet};
use std::collections::BTreeMap;
use u_asrs_core::{optimal_orientation, BinId, Dimensions, Error, Location, PalletId, Result};

/// Tightest-fit repacker over a priority list of bins.
#[derive(Debug, Clone, Copy)]
pub struct BestFit<'a> {
    priority: &'a [BinId],
    template: &'a Dimensions,
}

impl<'a> BestFit<'a> {
    /// Creates a reorganizer over the offline priority list and the shared bin dimensions.
    pub fn new(priority: &'a [BinId], template: &'a Dimensions) -> Self {
        Self { priority, template }
    }

    /// Clears every bin and repacks `pallets` into them.
    ///
    /// Returns the new location of every pallet, or [`Error::Reorganization`]
    /// listing every pallet that found no bin. On failure the bins hold a
    /// partial repack; callers restore their own snapshot.
    pub fn reorganize(
        &self,
        pallets: Vec<PlacedPallet>,
        bins: &mut BinMap,
    ) -> Result<BTreeMap<PalletId, Location>> {
        let mut unplaced = Vec::new();
        let mut queue: Vec<(f64, Pallet)> = Vec::with_capacity(pallets.len());

        for placed in pallets {
            let pallet = placed.into_pallet();
            match optimal_orientation(pallet.dimensions(), pallet.rotation(), self.template) {
                Some(oriented) => queue.push((oriented.y, pallet)),
                None => unplaced.push(pallet.id()),
            }
        }

        // Stable: equal heights keep collection order.
        queue.sort_by(|a, b| b.0.total_cmp(&a.0));

        for bin in bins.values_mut() {
            bin.reset();
        }

        let mut locations = BTreeMap::new();
        for (_, pallet) in queue {
            let Some(fit) = self.best_bin(&pallet, bins) else {
                log::debug!("Best fit found no bin for {}", pallet.label());
                unplaced.push(pallet.id());
                continue;
            };

            let bin = bins
                .get_mut(&fit.bin())
                .ok_or_else(|| Error::Internal(format!("bin {} vanished", fit.bin())))?;
            let placed = bin.place(pallet, fit)?;
            locations.insert(placed.id(), placed.location());
        }

        if unplaced.is_empty() {
            Ok(locations)
        } else {
            unplaced.sort_unstable();
            Err(Error::Reorganization { unplaced })
        }
    }

    fn candidate(&self, pallet: &Pallet, bins: &BinMap, id: BinId) -> Option<Fit> {
        let Some(bin) = bins.get(&id) else {
            log::warn!("Priority list references unknown bin {}", id);
            return None;
        };
        if !bin.accepts_weight(pallet.weight()) {
            return None;
        }
        bin.can_place_pallet(pallet)
    }

    fn remaining(&self, fit: &Fit) -> f64 {
        self.template.y - fit.top()
    }

    #[cfg(not(feature = "parallel"))]
    fn best_bin(&self, pallet: &Pallet, bins: &BinMap) -> Option<Fit> {
        let mut best: Option<Fit> = None;
        let mut min_remaining = f64::INFINITY;

        for &id in self.priority {
            let Some(fit) = self.candidate(pallet, bins, id) else {
                continue;
            };
            let remaining = self.remaining(&fit);
            if remaining < min_remaining {
                min_remaining = remaining;
                best = Some(fit);
            }
        }

        best
    }

    #[cfg(feature = "parallel")]
    fn best_bin(&self, pallet: &Pallet, bins: &BinMap) -> Option<Fit> {
        use rayon::prelude::*;

        self.priority
            .par_iter()
            .enumerate()
            .filter_map(|(rank, &id)| self.candidate(pallet, bins, id).map(|fit| (rank, fit)))
            .min_by(|(rank_a, a), (rank_b, b)| {
                self.remaining(a)
                    .total_cmp(&self.remaining(b))
                    .then(rank_a.cmp(rank_b))
            })
            .map(|(_, fit)| fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin::{Bin, BinTemplate};
    use crate::item::Item;
    use approx::assert_relative_eq;
    use u_asrs_core::stack_position;

    fn template() -> Dimensions {
        Dimensions::new(100.0, 100.0, 100.0)
    }

    fn bins(ids: &[BinId]) -> BinMap {
        let template = BinTemplate::new(100.0, 100.0, 100.0, 5.0);
        ids.iter().map(|&id| (id, template.build(id))).collect()
    }

    fn loaded(id: PalletId, height: f64) -> Pallet {
        Pallet::empty(id, Dimensions::new(50.0, 5.0, 50.0))
            .load(Item::new(format!("item-{}", id), 40.0, height, 40.0))
            .unwrap()
    }

    /// Stacks every pallet into one oversized staging bin and returns them as stored.
    fn staged(pallets: Vec<Pallet>) -> Vec<PlacedPallet> {
        let mut staging = Bin::new(99, 100.0, 10_000.0, 100.0).with_granularity(5.0);
        for pallet in pallets {
            let fit = staging.can_place_pallet(&pallet).unwrap();
            staging.place(pallet, fit).unwrap();
        }
        staging.drain()
    }

    #[test]
    fn test_tightest_bin_wins() {
        let mut bins = bins(&[1, 2]);
        let template = template();
        let priority = [1, 2];
        let pallets = staged(vec![loaded(1, 40.0), loaded(2, 60.0), loaded(3, 50.0)]);

        let locations = BestFit::new(&priority, &template)
            .reorganize(pallets, &mut bins)
            .unwrap();

        assert_eq!(locations[&2], Location::new(1, stack_position(0.0)));
        assert_eq!(locations[&3], Location::new(2, stack_position(0.0)));
        // 40 leaves 0 in bin 1 and 10 in bin 2.
        assert_eq!(locations[&1], Location::new(1, stack_position(60.0)));
        assert_relative_eq!(bins[&1].current_height(), 100.0);
    }

    #[test]
    fn test_ties_follow_priority_order() {
        let mut bins = bins(&[1, 2, 3]);
        let template = template();
        let priority = [3, 1, 2];
        let locations = BestFit::new(&priority, &template)
            .reorganize(staged(vec![loaded(1, 30.0)]), &mut bins)
            .unwrap();
        assert_eq!(locations[&1].bin, 3);
    }

    #[test]
    fn test_bins_are_reset_first() {
        let mut bins = bins(&[1]);
        let template = template();
        let priority = [1];
        let bin = bins.get_mut(&1).unwrap();
        let stale = loaded(7, 90.0);
        let fit = bin.can_place_pallet(&stale).unwrap();
        bin.place(stale, fit).unwrap();

        let locations = BestFit::new(&priority, &template)
            .reorganize(staged(vec![loaded(1, 30.0)]), &mut bins)
            .unwrap();
        assert_eq!(locations[&1].position, stack_position(0.0));
        assert!(!bins[&1].contains(7));
        assert_eq!(bins[&1].len(), 1);
    }

    #[test]
    fn test_overflow_lists_every_unplaced_pallet() {
        let mut bins = bins(&[1, 2]);
        let template = template();
        let priority = [1, 2];
        let pallets = staged((1..=5).map(|id| loaded(id, 60.0)).collect());

        let err = BestFit::new(&priority, &template)
            .reorganize(pallets, &mut bins)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Reorganization {
                unplaced: vec![3, 4, 5]
            }
        );
    }

    #[test]
    fn test_weight_limit_is_honored() {
        let mut bins = BinMap::new();
        let shared = BinTemplate::new(100.0, 100.0, 100.0, 5.0);
        bins.insert(1, shared.with_weight_limit(10.0).build(1));
        bins.insert(2, shared.build(2));
        let template = template();
        let priority = [1, 2];

        let heavy = Pallet::empty(1, Dimensions::new(50.0, 5.0, 50.0))
            .load(Item::new("heavy", 40.0, 30.0, 40.0).with_weight(20.0))
            .unwrap();
        let locations = BestFit::new(&priority, &template)
            .reorganize(staged(vec![heavy]), &mut bins)
            .unwrap();
        assert_eq!(locations[&1].bin, 2);
    }

    #[test]
    fn test_free_items_are_laid_flat() {
        let mut bins = bins(&[1]);
        let template = template();
        let priority = [1];
        let tall = Pallet::empty(1, Dimensions::new(50.0, 5.0, 50.0))
            .load(
                Item::new("tall", 20.0, 90.0, 30.0)
                    .with_rotation(u_asrs_core::RotationConstraint::Free),
            )
            .unwrap();
        BestFit::new(&priority, &template)
            .reorganize(staged(vec![tall]), &mut bins)
            .unwrap();
        let placed = bins[&1].get(1).unwrap();
        assert_relative_eq!(placed.placed_dimensions().y, 20.0);
    }
}
