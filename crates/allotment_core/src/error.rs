//! # Allotment Error Types
//!
//! All errors that can occur between reading the inputs and trusting a result.
//!
//! - [`ValidationError`]: announced inputs are malformed, stop before allocation
//! - [`AllocationError`]: the engine partitioned the pool wrongly (engine defect)
//! - [`VerificationError`]: a post-condition failed after allocation (engine defect)
//!
//! None of these are ever recovered from. Each one aborts the whole run.

use std::fmt;

use thiserror::Error;

use crate::types::{AssetId, WalletId};

/// A single problem found while validating the inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A wallet was declared with a zero or negative entitlement.
    #[error("wallet {wallet} declares a non-positive count of {count}")]
    NonPositiveCount {
        /// The offending wallet.
        wallet: WalletId,
        /// The declared count.
        count: i64,
    },

    /// The same wallet identifier appears more than once.
    #[error("wallet {wallet} is declared {occurrences} times")]
    DuplicateWallet {
        /// The repeated wallet.
        wallet: WalletId,
        /// How many times it was declared.
        occurrences: usize,
    },

    /// The same asset identifier appears more than once in the item pool.
    #[error("asset {asset} appears {occurrences} times in the item pool")]
    DuplicateAsset {
        /// The repeated asset.
        asset: AssetId,
        /// How many times it appears.
        occurrences: usize,
    },

    /// The entitlements do not add up to the size of the pool.
    #[error("wallets request {requested} items but the pool holds {available}")]
    SupplyMismatch {
        /// Sum of all declared counts.
        requested: i128,
        /// Number of items in the pool.
        available: usize,
    },
}

/// Every problem found by one validation pass.
///
/// Validation runs to completion, so a single report names all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationError>,
}

impl ValidationReport {
    pub(crate) fn new(issues: Vec<ValidationError>) -> Self {
        Self { issues }
    }

    /// All detected problems, in check order.
    #[must_use]
    pub fn issues(&self) -> &[ValidationError] {
        &self.issues
    }

    /// Returns true if the report contains this exact problem.
    #[must_use]
    pub fn contains(&self, issue: &ValidationError) -> bool {
        self.issues.contains(issue)
    }

    /// Number of problems found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// A report is never built empty; this exists for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input validation failed with {} issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Failures while partitioning the shuffled pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// The wallets consumed more or fewer items than the pool holds.
    #[error("internal allocation mismatch: consumed {consumed} of {available} items")]
    InternalAllocationMismatch {
        /// Items handed out (or about to be) when the mismatch was found.
        consumed: usize,
        /// Items in the shuffled pool.
        available: usize,
    },
}

/// Post-allocation integrity failures.
///
/// These must never occur for a result produced by this engine. When checking a
/// published result they mean the file does not match its inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The wallets in the result do not match the declared wallets one-to-one.
    #[error("wallet set mismatch for {wallet}: {kind}")]
    WalletSetMismatch {
        /// The wallet concerned.
        wallet: WalletId,
        /// What is wrong with it.
        kind: WalletSetIssue,
    },

    /// A wallet received a different number of items than it is entitled to.
    #[error("wallet {wallet} is entitled to {expected} items but the result gives {actual}")]
    CountMismatch {
        /// The wallet concerned.
        wallet: WalletId,
        /// Declared entitlement.
        expected: i64,
        /// Count in the result.
        actual: usize,
    },

    /// A record's declared count disagrees with the items it lists.
    #[error("record for {wallet} declares {declared} items but lists {listed}")]
    RecordLengthMismatch {
        /// The wallet concerned.
        wallet: WalletId,
        /// The record's count field.
        declared: usize,
        /// Length of the record's item list.
        listed: usize,
    },

    /// The result hands out a different number of items than the pool holds.
    #[error("result allocates {allocated} items but the pool holds {available}")]
    TotalMismatch {
        /// Sum of record counts.
        allocated: usize,
        /// Number of items in the pool.
        available: usize,
    },

    /// The same asset was handed out twice.
    #[error("asset {asset} is allocated to both {first} and {second}")]
    DuplicateInOutput {
        /// The repeated asset.
        asset: AssetId,
        /// First wallet holding it.
        first: WalletId,
        /// Second wallet holding it.
        second: WalletId,
    },

    /// The allocated assets are not exactly the pool's assets.
    #[error(
        "allocated assets differ from the pool: {} missing, {} not in the pool",
        missing.len(),
        invented.len()
    )]
    AssetSetMismatch {
        /// Pool assets that nobody received.
        missing: Vec<AssetId>,
        /// Allocated assets that are not in the pool.
        invented: Vec<AssetId>,
    },

    /// An allocated item does not reproduce the pool item with the same asset id.
    #[error("allocated item {asset} does not match its pool record")]
    ItemMismatch {
        /// The asset concerned.
        asset: AssetId,
    },
}

/// How a wallet fails the one-record-per-wallet rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletSetIssue {
    /// Declared wallet has no record.
    Missing,
    /// Record for a wallet that was never declared.
    Unexpected,
    /// More than one record for the same wallet.
    Repeated,
}

impl fmt::Display for WalletSetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("declared but has no allocation record"),
            Self::Unexpected => f.write_str("has a record but was never declared"),
            Self::Repeated => f.write_str("has more than one allocation record"),
        }
    }
}

/// Failures while deriving rarity labels for an unlabelled pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RarityError {
    /// Some records carry a rarity and others do not.
    #[error("{labelled} of {total} asset records carry a rarity; label all of them or none")]
    PartiallyLabelled {
        /// Records with a rarity.
        labelled: usize,
        /// All records.
        total: usize,
    },

    /// Records carry no rarity and no weights were configured.
    #[error("asset records carry no rarity and no rarity weights are configured")]
    MissingWeights,

    /// The configured weights do not add up to 100%.
    #[error("rarity weights sum to {total_bp} basis points, expected 10000")]
    InvalidWeights {
        /// Actual sum of the weights.
        total_bp: u64,
    },
}

/// A published result that this protocol does not reproduce.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReproductionError {
    /// The published result fails the structural checks.
    #[error("published allocation fails verification: {0}")]
    Integrity(#[from] VerificationError),

    /// The inputs themselves cannot be allocated.
    #[error("recomputing the allocation failed: {0}")]
    Recompute(Box<AllotmentError>),

    /// Records appear in a different wallet order.
    #[error("record {position} is for {published}, expected {expected}")]
    WalletOrderDiverges {
        /// Index of the first differing record.
        position: usize,
        /// Wallet the protocol places there.
        expected: WalletId,
        /// Wallet the published file places there.
        published: WalletId,
    },

    /// A wallet received different items, or in a different order.
    #[error("items for {wallet} diverge from the recomputed allocation at position {position}")]
    ItemsDiverge {
        /// The wallet concerned.
        wallet: WalletId,
        /// Index of the first differing item in that wallet's list.
        position: usize,
    },
}

/// Any failure of the validate -> allocate -> verify pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllotmentError {
    /// Inputs were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationReport),

    /// Partitioning went wrong.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The result failed its integrity checks.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Rarity labels could not be derived.
    #[error(transparent)]
    Rarity(#[from] RarityError),
}

/// Result type for allotment operations.
pub type AllotmentResult<T> = Result<T, AllotmentError>;
