//! The storage manager.
//!
//! [`AsrsManager`] owns every bin and orchestrates the pallet lifecycle:
//! seeding empty pallets, online placement by pallet exchange, removal with
//! gap repair, offline reorganization and nearest-pallet queries.
//!
//! Every mutating operation runs inside a snapshot/restore transaction, so
//! callers observe either the full effect or none of it.

use crate::best_fit::BestFit;
use crate::bin::{Bin, BinMap, BinTemplate};
use crate::config::ManagerConfig;
use crate::first_fit::{FirstFit, PalletExchange};
use crate::item::{carrier_dimensions, Item, Pallet, PlacedPallet};
use crate::movement::travel_distance;
use crate::result::{Removal, ReorganizeReport};
use std::collections::{BTreeMap, BTreeSet};
use u_asrs_core::{
    BinId, Dimensions, Entrance, Error, Location, PalletId, PlacementPlan, RemovalFailure, Result,
    EPSILON,
};

/// Collects and validates the parts of an [`AsrsManager`].
///
/// Both [`AsrsManager::from_config`] and [`AsrsManager::from_parts`] go
/// through this builder.
#[derive(Debug, Clone, Default)]
pub struct ManagerBuilder {
    template: Option<BinTemplate>,
    online_priority: Option<Vec<BinId>>,
    offline_priority: Option<Vec<BinId>>,
    pallet_bins: Vec<BinId>,
    pallet_count: usize,
    entrance: Option<Entrance>,
}

impl ManagerBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shared bin template.
    pub fn with_template(mut self, template: BinTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Sets the bin order for online placement.
    pub fn with_online_priority(mut self, priority: Vec<BinId>) -> Self {
        self.online_priority = Some(priority);
        self
    }

    /// Sets the bin order for offline reorganization.
    pub fn with_offline_priority(mut self, priority: Vec<BinId>) -> Self {
        self.offline_priority = Some(priority);
        self
    }

    /// Sets the bins that hold empty pallets.
    pub fn with_pallet_bins(mut self, bins: Vec<BinId>) -> Self {
        self.pallet_bins = bins;
        self
    }

    /// Sets the number of pallets seeded at construction.
    pub fn with_pallet_count(mut self, count: usize) -> Self {
        self.pallet_count = count;
        self
    }

    /// Sets the entrance used for nearest-pallet search.
    pub fn with_entrance(mut self, entrance: Entrance) -> Self {
        self.entrance = Some(entrance);
        self
    }

    /// Validates the collected parts.
    pub fn validate(&self) -> Result<()> {
        let template = self
            .template
            .as_ref()
            .ok_or_else(|| Error::Config("Missing bin template".into()))?;
        template.validate()?;

        let online = self
            .online_priority
            .as_deref()
            .ok_or_else(|| Error::Config("Missing online priority".into()))?;
        let offline = self
            .offline_priority
            .as_deref()
            .ok_or_else(|| Error::Config("Missing offline priority".into()))?;

        check_priority("online priority", online, false)?;
        check_priority("offline priority", offline, false)?;
        check_priority("pallet bins", &self.pallet_bins, true)?;

        if self.pallet_count > 0 && self.pallet_bins.is_empty() {
            return Err(Error::Config(format!(
                "{} pallets requested but no pallet bins given",
                self.pallet_count
            )));
        }
        if PalletId::try_from(self.pallet_count).is_err() {
            return Err(Error::Config(format!(
                "Pallet count {} exceeds the id range",
                self.pallet_count
            )));
        }

        if let Some(entrance) = &self.entrance {
            if !(entrance.height.is_finite() && entrance.height >= 0.0) {
                return Err(Error::Config(
                    "Entrance height must be non-negative".into(),
                ));
            }
        }

        Ok(())
    }

    /// Validates, creates every bin and seeds the empty pallets.
    pub fn build(self) -> Result<AsrsManager> {
        self.validate()?;

        let (Some(template), Some(online_priority), Some(offline_priority)) =
            (self.template, self.online_priority, self.offline_priority)
        else {
            return Err(Error::Internal("validated builder lost a part".into()));
        };

        let ids: BTreeSet<BinId> = online_priority
            .iter()
            .chain(&offline_priority)
            .chain(&self.pallet_bins)
            .copied()
            .collect();
        let bins: BinMap = ids.into_iter().map(|id| (id, template.build(id))).collect();

        let entrance = match (self.entrance, online_priority.first()) {
            (Some(entrance), _) => entrance,
            (None, Some(&first)) => Entrance::new(first, 0.0),
            (None, None) => return Err(Error::Config("The online priority list is empty".into())),
        };

        let mut manager = AsrsManager {
            bins,
            template,
            online_priority,
            offline_priority,
            pallet_bins: self.pallet_bins,
            entrance,
        };
        manager.seed(self.pallet_count)?;

        log::debug!(
            "Manager ready: {} bins, {} pallets, entrance at bin {}",
            manager.bins.len(),
            self.pallet_count,
            manager.entrance.bin
        );
        Ok(manager)
    }
}

impl From<ManagerConfig> for ManagerBuilder {
    fn from(config: ManagerConfig) -> Self {
        let builder = ManagerBuilder::new()
            .with_template(config.bin_config.template())
            .with_online_priority(config.online_priority)
            .with_offline_priority(config.offline_priority)
            .with_pallet_bins(config.pallet_bins)
            .with_pallet_count(config.pallet_count);
        match config.entrance {
            Some(entrance) => builder.with_entrance(entrance),
            None => builder,
        }
    }
}

fn check_priority(name: &str, ids: &[BinId], allow_empty: bool) -> Result<()> {
    if ids.is_empty() && !allow_empty {
        return Err(Error::Config(format!("The {} list is empty", name)));
    }
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(Error::Config(format!(
                "Bin {} appears twice in the {} list",
                id, name
            )));
        }
    }
    Ok(())
}

/// Orchestrates bins, pallets and the placement algorithms.
#[derive(Debug, Clone)]
pub struct AsrsManager {
    bins: BinMap,
    template: BinTemplate,
    online_priority: Vec<BinId>,
    offline_priority: Vec<BinId>,
    pallet_bins: Vec<BinId>,
    entrance: Entrance,
}

impl AsrsManager {
    /// Creates a manager from a configuration structure.
    pub fn from_config(config: ManagerConfig) -> Result<Self> {
        ManagerBuilder::from(config).build()
    }

    /// Creates a manager from individually supplied parts.
    pub fn from_parts(
        template: BinTemplate,
        online_priority: Vec<BinId>,
        offline_priority: Vec<BinId>,
        pallet_bins: Vec<BinId>,
        pallet_count: usize,
        entrance: Option<Entrance>,
    ) -> Result<Self> {
        let builder = ManagerBuilder::new()
            .with_template(template)
            .with_online_priority(online_priority)
            .with_offline_priority(offline_priority)
            .with_pallet_bins(pallet_bins)
            .with_pallet_count(pallet_count);
        match entrance {
            Some(entrance) => builder.with_entrance(entrance),
            None => builder,
        }
        .build()
    }

    /// Returns an empty builder.
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    fn seed(&mut self, count: usize) -> Result<()> {
        let carrier = self.carrier();
        let first_fit = FirstFit::new(&self.pallet_bins);
        for id in (1..).take(count) {
            first_fit
                .place(Pallet::empty(id, carrier), &mut self.bins)
                .map_err(|e| Error::Config(format!("Cannot seed pallet {}: {}", id, e)))?;
        }
        Ok(())
    }

    /// Runs `f` against the manager, restoring every bin if it fails.
    fn transaction<T>(&mut self, op: &str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.bins.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("{} failed, restoring bins: {}", op, e);
                self.bins = snapshot;
                Err(e)
            }
        }
    }

    /// Returns the dimensions of an empty carrier.
    pub fn carrier(&self) -> Dimensions {
        carrier_dimensions(&self.template.dimensions, self.template.granularity)
    }

    // ------------------------------------------------------------------
    // Online placement
    // ------------------------------------------------------------------

    /// Plans a pallet exchange for `item` without changing any state.
    pub fn plan_online(&self, item: &Item) -> Result<PlacementPlan> {
        item.validate()?;
        let pallet = self.get_closest_pallet(&self.entrance);
        PalletExchange::new(&self.online_priority, &self.template.dimensions)
            .plan(item, pallet, &self.bins)?
            .build()
    }

    /// Places `item` by loading the nearest empty pallet and moving it to the
    /// first online bin with room. On error nothing changes.
    pub fn place_item_online(&mut self, item: Item) -> Result<PlacementPlan> {
        let plan = self.plan_online(&item)?;
        self.execute(&plan, item)?;
        Ok(plan)
    }

    /// Executes a plan: withdraw the pallet, load `item`, stack it at the
    /// target. The plan is re-validated against the current bins and against
    /// `item`, whose orientation must match the planned dimensions.
    pub fn execute(&mut self, plan: &PlacementPlan, item: Item) -> Result<()> {
        self.transaction("execute", |manager| {
            let id = plan.pallet_id();
            let oriented = item
                .optimal_orientation(&manager.template.dimensions)
                .ok_or_else(|| Error::Dimension(item.id().clone()))?;
            if (oriented - plan.dimensions()).amax() > EPSILON {
                return Err(Error::Internal(format!(
                    "plan for pallet {} was made for other dimensions than '{}'",
                    id,
                    item.id()
                )));
            }

            let source = manager.bins.get_mut(&plan.source().bin).ok_or_else(|| {
                Error::Internal(format!("source bin {} does not exist", plan.source().bin))
            })?;

            let stored = source
                .get(id)
                .ok_or_else(|| Error::Internal(format!("pallet {} has moved", id)))?;
            if (stored.position().y - plan.source().height()).abs() > EPSILON {
                return Err(Error::Internal(format!("pallet {} has moved", id)));
            }

            let withdrawal = source
                .withdraw(id)
                .ok_or_else(|| Error::Internal(format!("pallet {} has moved", id)))?;
            let pallet = withdrawal.placed.into_pallet().load(item)?;

            let target = manager.bins.get_mut(&plan.target().bin).ok_or_else(|| {
                Error::Internal(format!("target bin {} does not exist", plan.target().bin))
            })?;
            if !target.accepts_weight(pallet.weight()) {
                return Err(Error::Internal(format!(
                    "bin {} rejects the weight of {}",
                    target.id(),
                    pallet.label()
                )));
            }
            let fit = target
                .fit_at(plan.dimensions(), &plan.target().position)
                .ok_or_else(|| {
                    Error::Internal(format!("plan for pallet {} no longer fits its target", id))
                })?;

            let placed = target.place(pallet, fit)?;
            log::debug!(
                "Pallet {} carries '{}' from bin {} to bin {} at height {}",
                id,
                placed.pallet().label(),
                plan.source().bin,
                plan.target().bin,
                plan.target().height()
            );
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Offline reorganization
    // ------------------------------------------------------------------

    /// Repacks every loaded pallet into the offline priority bins with
    /// Best-Fit, then re-seats the empty pallets into the pallet bins.
    ///
    /// On failure every bin is restored and the error names all pallets
    /// that found no place.
    pub fn reorganize_offline(&mut self) -> Result<ReorganizeReport> {
        self.transaction("reorganize_offline", |manager| {
            let before = manager.locations();

            let mut loaded = Vec::new();
            let mut empty = Vec::new();
            for bin in manager.bins.values_mut() {
                for placed in bin.drain() {
                    if placed.is_empty() {
                        empty.push(placed.into_pallet());
                    } else {
                        loaded.push(placed);
                    }
                }
            }

            let mut unplaced = match BestFit::new(
                &manager.offline_priority,
                &manager.template.dimensions,
            )
            .reorganize(loaded, &mut manager.bins)
            {
                Ok(_) => Vec::new(),
                Err(Error::Reorganization { unplaced }) => unplaced,
                Err(e) => return Err(e),
            };

            let first_fit = FirstFit::new(&manager.pallet_bins);
            for pallet in empty {
                let id = pallet.id();
                if let Err(e) = first_fit.place(pallet, &mut manager.bins) {
                    log::debug!("Empty pallet {} found no pallet bin: {}", id, e);
                    unplaced.push(id);
                }
            }

            if !unplaced.is_empty() {
                unplaced.sort_unstable();
                return Err(Error::Reorganization { unplaced });
            }

            let locations = manager.locations();
            let width = manager.template.dimensions.x;
            let mut report = ReorganizeReport::default();
            for (id, to) in locations {
                if let Some(from) = before.get(&id) {
                    if travel_distance(from, &to, width) <= EPSILON {
                        report.unchanged += 1;
                    }
                    report.movement.record(from, &to, width);
                }
                report.locations.insert(id, to);
            }

            log::debug!(
                "Reorganized {} pallets, {} moved over {:.1}",
                report.pallet_count(),
                report.movement.moved,
                report.movement.total()
            );
            Ok(report)
        })
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Unloads the pallet `id`, closes the gap it leaves and re-seats the
    /// empty pallet into the first pallet bin with room. On error nothing
    /// changes.
    pub fn remove_item(&mut self, id: PalletId) -> Result<Removal> {
        let refused = |reason| Error::Removal { id, reason };

        let stored = self
            .retrieve_item(id)
            .ok_or_else(|| refused(RemovalFailure::NotFound))?;
        if stored.is_empty() {
            return Err(refused(RemovalFailure::AlreadyEmpty));
        }
        let owner = stored.bin();
        let carrier = self.carrier();

        self.transaction("remove_item", |manager| {
            let withdrawal = manager
                .bins
                .get_mut(&owner)
                .and_then(|bin| bin.withdraw(id))
                .ok_or_else(|| Error::Internal(format!("pallet {} vanished from bin {}", id, owner)))?;

            let (pallet, cargo) = withdrawal.placed.into_pallet().unload(carrier);
            let cargo =
                cargo.ok_or_else(|| Error::Internal(format!("pallet {} had no cargo", id)))?;

            let location = FirstFit::new(&manager.pallet_bins)
                .place(pallet, &mut manager.bins)
                .map_err(|_| refused(RemovalFailure::NoPalletBin))?;
            let pallet = manager
                .bins
                .get(&location.bin)
                .and_then(|bin| bin.get(id))
                .cloned()
                .ok_or_else(|| Error::Internal(format!("pallet {} was not re-seated", id)))?;

            log::debug!(
                "Removed '{}' from bin {}, pallet {} back in bin {} at height {}, {} shifted",
                cargo.id(),
                owner,
                id,
                location.bin,
                location.height(),
                withdrawal.shifted.len()
            );
            Ok(Removal {
                pallet,
                cargo,
                shifted: withdrawal.shifted,
            })
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns the empty pallet nearest to `entrance`.
    ///
    /// Distance is `bin_width * |bin - entrance.bin| + |y - entrance.height|`;
    /// ties keep pallet-bin order, then pallet id order.
    pub fn get_closest_pallet(&self, entrance: &Entrance) -> Option<&PlacedPallet> {
        let origin = entrance.location();
        let width = self.template.dimensions.x;

        let mut best = None;
        let mut min_distance = f64::INFINITY;
        for bin_id in &self.pallet_bins {
            let Some(bin) = self.bins.get(bin_id) else {
                continue;
            };
            for pallet in bin.pallets().filter(|p| p.is_empty()) {
                let distance = travel_distance(&origin, &pallet.location(), width);
                if distance < min_distance {
                    min_distance = distance;
                    best = Some(pallet);
                }
            }
        }
        best
    }

    /// Returns the stored pallet with the given id.
    pub fn retrieve_item(&self, id: PalletId) -> Option<&PlacedPallet> {
        self.bins.values().find_map(|bin| bin.get(id))
    }

    /// Returns the stored pallet carrying the arrival `item_id`.
    pub fn find_cargo(&self, item_id: &str) -> Option<&PlacedPallet> {
        self.bins
            .values()
            .flat_map(|bin| bin.pallets())
            .find(|p| p.pallet().item().is_some_and(|item| item.id() == item_id))
    }

    /// Returns every stored pallet by id.
    pub fn get_all_items(&self) -> BTreeMap<PalletId, &PlacedPallet> {
        self.bins
            .values()
            .flat_map(|bin| bin.pallets())
            .map(|p| (p.id(), p))
            .collect()
    }

    /// Returns the location of every stored pallet.
    pub fn locations(&self) -> BTreeMap<PalletId, Location> {
        self.bins
            .values()
            .flat_map(|bin| bin.pallets())
            .map(|p| (p.id(), p.location()))
            .collect()
    }

    /// Returns a deep copy of every bin.
    pub fn snapshot(&self) -> BinMap {
        self.bins.clone()
    }

    /// Returns the used share of the total stacking height (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let used: f64 = self.bins.values().map(|bin| bin.current_height()).sum();
        used / (self.template.dimensions.y * self.bins.len() as f64)
    }

    /// Returns the number of empty pallets anywhere in the system.
    pub fn empty_pallet_count(&self) -> usize {
        self.bins
            .values()
            .flat_map(|bin| bin.pallets())
            .filter(|p| p.is_empty())
            .count()
    }

    /// Returns every bin.
    pub fn bins(&self) -> &BinMap {
        &self.bins
    }

    /// Returns a bin by id.
    pub fn bin(&self, id: BinId) -> Option<&Bin> {
        self.bins.get(&id)
    }

    /// Returns the shared bin template.
    pub fn template(&self) -> &BinTemplate {
        &self.template
    }

    /// Returns the entrance.
    pub fn entrance(&self) -> &Entrance {
        &self.entrance
    }

    /// Returns the online priority list.
    pub fn online_priority(&self) -> &[BinId] {
        &self.online_priority
    }

    /// Returns the offline priority list.
    pub fn offline_priority(&self) -> &[BinId] {
        &self.offline_priority
    }

    /// Returns the pallet bins.
    pub fn pallet_bins(&self) -> &[BinId] {
        &self.pallet_bins
    }
}
