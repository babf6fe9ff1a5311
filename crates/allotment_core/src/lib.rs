//! # ALLOTMENT Core
//!
//! Deterministic, seed-driven distribution of a fixed pool of unique items
//! across wallets with declared entitlements.
//!
//! ## Design Principles
//!
//! 1. **Reproducible** - the result is a pure function of (entitlements, pool, seed)
//! 2. **All-or-nothing** - validate, allocate and verify succeed together or not at all
//! 3. **Zero floating point** - rarity weights are integer basis points
//! 4. **No I/O** - reading and writing files belongs to the caller
//!
//! ## Example
//!
//! ```rust
//! use allotment_core::{run, Entitlements, Item, ItemPool, Seed};
//!
//! let entitlements: Entitlements = [("w1", 2), ("w2", 1)].into_iter().collect();
//! let pool: ItemPool = ["a", "b", "c"]
//!     .into_iter()
//!     .map(|asset| Item::new(asset, "Common"))
//!     .collect();
//!
//! let result = run(&entitlements, &pool, &Seed::new("public-seed")).unwrap();
//! assert_eq!(result.total_items(), 3);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod engine;
pub mod error;
pub mod rarity;
pub mod reproduce;
pub mod seed;
pub mod summary;
pub mod types;

pub use engine::{allocate, run, validate, verify, ValidatedInput};
pub use error::{
    AllocationError, AllotmentError, AllotmentResult, RarityError, ReproductionError,
    ValidationError, ValidationReport, VerificationError, WalletSetIssue,
};
pub use rarity::{build_pool, RarityWeights, BASIS_POINTS};
pub use reproduce::reproduce;
pub use seed::{permutation, Seed, SeedRng, PROTOCOL_ID};
pub use summary::AllocationSummary;
pub use types::{
    AllocationRecord, AllocationResult, AssetId, AssetRecord, Entitlement, Entitlements, Item,
    ItemPool, WalletId,
};
