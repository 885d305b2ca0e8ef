//! Manager configuration.
//!
//! Mirrors the layout of the system description file:
//!
//! ```json
//! {
//!   "bin_config": { "width": 100, "height": 100, "depth": 100, "min_adjust_length": 5 },
//!   "online_priority": [5, 4, 6, 3, 7],
//!   "offline_priority": [7, 3, 6, 4, 5],
//!   "pallet_bins": [1, 2],
//!   "pallet_count": 20,
//!   "entrance": { "bin": 5, "height": 50 }
//! }
//! ```

use crate::bin::BinTemplate;
use u_asrs_core::{BinId, Entrance};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dimensions and limits shared by every bin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinConfig {
    /// Bin width.
    pub width: f64,
    /// Bin height (stacking budget).
    pub height: f64,
    /// Bin depth.
    pub depth: f64,
    /// Shelf quantization step.
    pub min_adjust_length: f64,
    /// Per-item weight limit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weight_limit: Option<f64>,
}

impl BinConfig {
    /// Creates a bin configuration without weight limit.
    pub fn new(width: f64, height: f64, depth: f64, min_adjust_length: f64) -> Self {
        Self {
            width,
            height,
            depth,
            min_adjust_length,
            weight_limit: None,
        }
    }

    /// Returns the equivalent bin template.
    pub fn template(&self) -> BinTemplate {
        let template = BinTemplate::new(self.width, self.height, self.depth, self.min_adjust_length);
        match self.weight_limit {
            Some(limit) => template.with_weight_limit(limit),
            None => template,
        }
    }
}

impl From<BinTemplate> for BinConfig {
    fn from(template: BinTemplate) -> Self {
        Self {
            width: template.dimensions.x,
            height: template.dimensions.y,
            depth: template.dimensions.z,
            min_adjust_length: template.granularity,
            weight_limit: template.weight_limit,
        }
    }
}

/// Full configuration of an [`AsrsManager`](crate::AsrsManager).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManagerConfig {
    /// Bin dimensions and limits.
    pub bin_config: BinConfig,

    /// Bin order tried by online placement.
    pub online_priority: Vec<BinId>,

    /// Bin order tried by offline reorganization.
    pub offline_priority: Vec<BinId>,

    /// Bins that hold empty pallets, in seeding order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pallet_bins: Vec<BinId>,

    /// Number of empty pallets seeded at construction.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pallet_count: usize,

    /// Distance reference for nearest-pallet search. Defaults to the bottom
    /// of the first online bin.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entrance: Option<Entrance>,
}

impl ManagerConfig {
    /// Creates a configuration without pallets.
    pub fn new(bin_config: BinConfig, online_priority: Vec<BinId>, offline_priority: Vec<BinId>) -> Self {
        Self {
            bin_config,
            online_priority,
            offline_priority,
            pallet_bins: Vec::new(),
            pallet_count: 0,
            entrance: None,
        }
    }

    /// Sets the pallet bins.
    pub fn with_pallet_bins(mut self, bins: Vec<BinId>) -> Self {
        self.pallet_bins = bins;
        self
    }

    /// Sets the number of seeded pallets.
    pub fn with_pallet_count(mut self, count: usize) -> Self {
        self.pallet_count = count;
        self
    }

    /// Sets the entrance.
    pub fn with_entrance(mut self, entrance: Entrance) -> Self {
        self.entrance = Some(entrance);
        self
    }

    /// Sets the per-item weight limit of every bin.
    pub fn with_weight_limit(mut self, limit: f64) -> Self {
        self.bin_config.weight_limit = Some(limit);
        self
    }

    /// Validates the configuration without building a manager.
    pub fn validate(&self) -> u_asrs_core::Result<()> {
        crate::manager::ManagerBuilder::from(self.clone()).validate()
    }

    /// Returns every bin id named by any list, sorted and deduplicated.
    pub fn bin_ids(&self) -> Vec<BinId> {
        let mut ids: Vec<BinId> = self
            .online_priority
            .iter()
            .chain(&self.offline_priority)
            .chain(&self.pallet_bins)
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ManagerConfig {
        ManagerConfig::new(
            BinConfig::new(100.0, 100.0, 100.0, 5.0),
            vec![3, 2, 4],
            vec![4, 2, 3],
        )
        .with_pallet_bins(vec![1, 5])
        .with_pallet_count(4)
    }

    #[test]
    fn test_bin_ids_union() {
        assert_eq!(config().bin_ids(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_duplicate_priority_is_rejected() {
        let mut cfg = config();
        cfg.online_priority = vec![3, 3];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_pallets_need_pallet_bins() {
        let cfg = config().with_pallet_bins(Vec::new());
        assert!(cfg.validate().is_err());
        assert!(cfg.with_pallet_count(0).validate().is_ok());
    }

    #[test]
    fn test_template_round_trip() {
        let bin_config = BinConfig::new(60.0, 200.0, 60.0, 5.0);
        let template = BinConfig {
            weight_limit: Some(80.0),
            ..bin_config
        }
        .template();
        assert_eq!(template.weight_limit, Some(80.0));
        assert_eq!(BinConfig::from(template).min_adjust_length, 5.0);
    }
}
