//! Simulation harness for U-ASRS
//!
//! This crate provides:
//! - Arrival feeds: JSON loading and seeded random generation
//! - A runner that replays a feed through an `AsrsManager`
//! - Serializable reports of placement outcomes and carrier travel

mod feed;
mod runner;

pub use feed::{
    generate_arrivals, load_arrivals, load_config, save_arrivals, ArrivalRecord, FeedError,
    GeneratorConfig, RotationMode,
};
pub use runner::{ReorganizationOutcome, SimulationReport, SimulationRunner};
