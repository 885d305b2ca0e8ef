//! Error types for U-ASRS.

use crate::geometry::ItemId;
use crate::placement::PalletId;
use thiserror::Error;

/// Result type alias for U-ASRS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a removal request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalFailure {
    /// No bin holds a pallet with the requested id.
    NotFound,
    /// The pallet carries no cargo.
    AlreadyEmpty,
    /// No pallet-designated bin has room for the freed pallet.
    NoPalletBin,
}

impl std::fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemovalFailure::NotFound => write!(f, "not found"),
            RemovalFailure::AlreadyEmpty => write!(f, "pallet is already empty"),
            RemovalFailure::NoPalletBin => write!(f, "no pallet bin can accept the freed pallet"),
        }
    }
}

/// Errors that can occur during placement, removal and reorganization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No orientation of the item fits any bin footprint.
    #[error("No orientation of '{0}' fits the bin footprint")]
    Dimension(ItemId),

    /// The footprint fits but no bin in priority order has height or weight budget left.
    #[error("No bin in priority order has capacity for '{0}'")]
    Capacity(ItemId),

    /// No empty pallet is available for an exchange.
    #[error("No empty pallet available")]
    PalletUnavailable,

    /// A placement plan was missing a required field.
    #[error("Placement plan incomplete: missing {0}")]
    PlacementPlanIncomplete(&'static str),

    /// The global repack could not place every pallet.
    #[error("Reorganization failed, {} pallet(s) could not be placed: {unplaced:?}", unplaced.len())]
    Reorganization {
        /// Every pallet id that found no bin.
        unplaced: Vec<PalletId>,
    },

    /// A removal request was refused.
    #[error("Removal of pallet {id} failed: {reason}")]
    Removal {
        /// Requested pallet id.
        id: PalletId,
        /// Classified cause.
        reason: RemovalFailure,
    },

    /// Configuration or construction error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid item geometry provided.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Internal invariant violation.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if the same request may succeed after space or pallets are freed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Capacity(_)
                | Error::PalletUnavailable
                | Error::Reorganization { .. }
                | Error::Removal {
                    reason: RemovalFailure::NoPalletBin,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Capacity("A".into()).is_retryable());
        assert!(Error::PalletUnavailable.is_retryable());
        assert!(!Error::Dimension("A".into()).is_retryable());
        assert!(!Error::PlacementPlanIncomplete("target").is_retryable());
        assert!(Error::Removal {
            id: 3,
            reason: RemovalFailure::NoPalletBin
        }
        .is_retryable());
        assert!(!Error::Removal {
            id: 3,
            reason: RemovalFailure::NotFound
        }
        .is_retryable());
    }

    #[test]
    fn test_reorganization_message_lists_ids() {
        let err = Error::Reorganization {
            unplaced: vec![4, 9],
        };
        assert_eq!(
            err.to_string(),
            "Reorganization failed, 2 pallet(s) could not be placed: [4, 9]"
        );
    }
}
