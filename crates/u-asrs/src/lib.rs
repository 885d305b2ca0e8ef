//! # U-ASRS
//!
//! Storage allocation engine for automated storage and retrieval systems.
//!
//! This crate provides:
//! - **Online placement**: items arrive on reusable pallets and are stacked
//!   into the first column with room
//! - **Offline reorganization**: a tightest-fit repack of every column
//! - **Lifecycle management**: removal with gap repair, nearest-pallet search
//!
//! ## Quick Start
//!
//! ```rust
//! use u_asrs::stacking::{AsrsManager, BinConfig, Item, ManagerConfig};
//!
//! let config = ManagerConfig::new(BinConfig::new(100.0, 100.0, 100.0, 5.0), vec![3, 2], vec![2, 3])
//!     .with_pallet_bins(vec![1])
//!     .with_pallet_count(4);
//! let mut manager = AsrsManager::from_config(config)?;
//!
//! manager.place_item_online(Item::new("box-1", 40.0, 30.0, 40.0))?;
//! let report = manager.reorganize_offline()?;
//! assert_eq!(report.pallet_count(), 4);
//! # Ok::<(), u_asrs::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support
//! - `parallel`: Parallel bin scan during reorganization

/// Errors, geometry utilities and placement plans.
pub use u_asrs_core as core;

/// Bins, pallets, planners and the manager.
pub use u_asrs_stacking as stacking;

// Re-export commonly used types at root level
pub use u_asrs_core::{Error, PlacementPlan, Result};
pub use u_asrs_stacking::{AsrsManager, Item, ManagerConfig, ReorganizeReport};
