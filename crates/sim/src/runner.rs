//! Feed replay.

use crate::feed::{ArrivalRecord, FeedError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use u_asrs::core::PalletId;
use u_asrs::stacking::MovementSummary;
use u_asrs::{AsrsManager, Error};

/// Outcome of the reorganization step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizationOutcome {
    /// Whether every pallet was repacked
    pub success: bool,
    /// Pallets that found no place (empty on success)
    pub unplaced: Vec<PalletId>,
    /// Pallets that ended where they started
    pub unchanged: usize,
    /// Travel caused by the repack
    pub movement: MovementSummary,
    /// Used share of the total stacking height afterwards
    pub utilization: f64,
}

/// Result of replaying a feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Records in the feed
    pub arrivals: usize,
    /// Records placed online
    pub placed: usize,
    /// Failed placements by error class
    pub failures: BTreeMap<String, usize>,
    /// Ids of records that were not placed, in feed order
    pub rejected: Vec<String>,
    /// Travel from the entrance to every online target
    pub online_movement: MovementSummary,
    /// Used share of the total stacking height after online placement
    pub online_utilization: f64,
    /// Reorganization outcome, if one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorganization: Option<ReorganizationOutcome>,
    /// Wall-clock time in milliseconds
    pub computation_time_ms: u64,
}

impl SimulationReport {
    /// Returns the number of failed placements.
    pub fn failed(&self) -> usize {
        self.failures.values().sum()
    }

    /// Prints a human-readable summary.
    pub fn print_summary(&self) {
        println!("Online placement:");
        println!("  placed {}/{} arrivals", self.placed, self.arrivals);
        for (class, count) in &self.failures {
            println!("  {:<20} {}", class, count);
        }
        println!(
            "  travel: horizontal={:.1} vertical={:.1} total={:.1}",
            self.online_movement.horizontal,
            self.online_movement.vertical,
            self.online_movement.total()
        );
        println!("  utilization: {:.1}%", self.online_utilization * 100.0);

        if let Some(reorg) = &self.reorganization {
            println!("Offline reorganization:");
            if reorg.success {
                println!(
                    "  moved {} pallets ({} unchanged), travel={:.1}",
                    reorg.movement.moved,
                    reorg.unchanged,
                    reorg.movement.total()
                );
            } else {
                println!("  failed, unplaced pallets: {:?}", reorg.unplaced);
            }
            println!("  utilization: {:.1}%", reorg.utilization * 100.0);
        }
        println!("Time: {}ms", self.computation_time_ms);
    }

    /// Saves the report as JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), FeedError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn failure_class(error: &Error) -> &'static str {
    match error {
        Error::Dimension(_) => "dimension",
        Error::Capacity(_) => "capacity",
        Error::PalletUnavailable => "pallet_unavailable",
        Error::InvalidGeometry(_) => "invalid_geometry",
        _ => "internal",
    }
}

/// Replays arrival feeds through a manager.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    reorganize: bool,
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self { reorganize: true }
    }
}

impl SimulationRunner {
    /// Creates a runner that reorganizes after the feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the final reorganization.
    pub fn with_reorganize(mut self, reorganize: bool) -> Self {
        self.reorganize = reorganize;
        self
    }

    /// Places every record online in feed order, skipping failures, then
    /// optionally reorganizes.
    pub fn run(&self, manager: &mut AsrsManager, arrivals: &[ArrivalRecord]) -> SimulationReport {
        let start = Instant::now();
        let mut report = SimulationReport {
            arrivals: arrivals.len(),
            ..SimulationReport::default()
        };

        let origin = manager.entrance().location();
        let width = manager.template().dimensions.x;

        for record in arrivals {
            match manager.place_item_online(record.to_item()) {
                Ok(plan) => {
                    report.placed += 1;
                    report.online_movement.record(&origin, &plan.target(), width);
                }
                Err(e) => {
                    log::debug!("Arrival '{}' rejected: {}", record.id, e);
                    *report
                        .failures
                        .entry(failure_class(&e).to_string())
                        .or_insert(0) += 1;
                    report.rejected.push(record.id.clone());
                }
            }
        }
        report.online_utilization = manager.utilization();

        if self.reorganize {
            let outcome = match manager.reorganize_offline() {
                Ok(reorg) => ReorganizationOutcome {
                    success: true,
                    unplaced: Vec::new(),
                    unchanged: reorg.unchanged,
                    movement: reorg.movement,
                    utilization: manager.utilization(),
                },
                Err(e) => {
                    let unplaced = match e {
                        Error::Reorganization { unplaced } => unplaced,
                        _ => Vec::new(),
                    };
                    ReorganizationOutcome {
                        success: false,
                        unplaced,
                        unchanged: 0,
                        movement: MovementSummary::new(),
                        utilization: manager.utilization(),
                    }
                }
            };
            report.reorganization = Some(outcome);
        }

        report.computation_time_ms = start.elapsed().as_millis() as u64;
        report
    }
}
