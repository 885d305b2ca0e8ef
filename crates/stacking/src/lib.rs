//! # U-ASRS Stacking
//!
//! Single-stack storage allocation for the U-ASRS engine.
//!
//! Every bin is a vertical column holding one pallet per height band. Items
//! arrive on reusable pallets: an empty pallet is taken from a pallet bin,
//! loaded and moved to the first online bin with room, and returned to a
//! pallet bin when its cargo leaves.
//!
//! ## Core Components
//!
//! - **Bins**: [`Bin`], quantized gap-free stacking with cascading withdrawal
//! - **Pallets**: [`Item`], [`Pallet`], [`PlacedPallet`]
//! - **Online placement**: [`FirstFit`] and [`PalletExchange`]
//! - **Offline reorganization**: [`BestFit`] (tightest fit, tallest first)
//! - **Orchestration**: [`AsrsManager`] with transactional operations
//!
//! ## Example
//!
//! ```
//! use u_asrs_stacking::{AsrsManager, BinConfig, Item, ManagerConfig};
//!
//! let config = ManagerConfig::new(BinConfig::new(100.0, 100.0, 100.0, 5.0), vec![3, 2], vec![2, 3])
//!     .with_pallet_bins(vec![1])
//!     .with_pallet_count(4);
//! let mut manager = AsrsManager::from_config(config).unwrap();
//!
//! let plan = manager.place_item_online(Item::new("box-1", 40.0, 30.0, 40.0)).unwrap();
//! assert_eq!(plan.target().bin, 3);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support
//! - `parallel`: Scan candidate bins in parallel during reorganization

pub mod best_fit;
pub mod bin;
pub mod config;
pub mod first_fit;
pub mod item;
pub mod manager;
pub mod movement;
pub mod result;

// Re-exports
pub use best_fit::BestFit;
pub use bin::{Bin, BinMap, BinTemplate, Fit, Withdrawal};
pub use config::{BinConfig, ManagerConfig};
pub use first_fit::{FirstFit, PalletExchange};
pub use item::{carrier_dimensions, Item, Pallet, PlacedPallet};
pub use manager::{AsrsManager, ManagerBuilder};
pub use movement::{travel_distance, MovementSummary};
pub use result::{Removal, ReorganizeReport};
pub use u_asrs_core::{
    BinId, Dimensions, Entrance, Error, ItemId, Location, PalletId, PlacementPlan, Position,
    RemovalFailure, Result, RotationConstraint,
};
