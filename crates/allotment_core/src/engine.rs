//! # Allocation Engine
//!
//! ```text
//! (entitlements, pool, seed)
//!     -> validate   every input invariant, all problems reported together
//!     -> allocate   global seeded shuffle, then wallets consume it in order
//!     -> verify     independent recount of the finished result
//!     -> AllocationResult
//! ```
//!
//! Single-threaded and synchronous. Nothing here reads the clock, the
//! environment or any global state, so the result is a pure function of the
//! three inputs.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::error::{
    AllocationError, AllotmentResult, ValidationError, ValidationReport, VerificationError,
    WalletSetIssue,
};
use crate::seed::{permutation, Seed};
use crate::types::{
    AllocationRecord, AllocationResult, AssetId, Entitlements, Item, ItemPool, WalletId,
};

/// Inputs that passed [`validate`].
///
/// The only way to reach [`allocate`]: unvalidated input cannot be shuffled.
#[derive(Debug)]
pub struct ValidatedInput<'a> {
    entitlements: &'a Entitlements,
    pool: &'a ItemPool,
    /// Positive counts, parallel to `entitlements`.
    counts: Vec<usize>,
}

impl<'a> ValidatedInput<'a> {
    /// The validated entitlements.
    #[must_use]
    pub fn entitlements(&self) -> &'a Entitlements {
        self.entitlements
    }

    /// The validated pool.
    #[must_use]
    pub fn pool(&self) -> &'a ItemPool {
        self.pool
    }

    /// Number of items to hand out (equals the pool size).
    #[must_use]
    pub fn total_supply(&self) -> usize {
        self.pool.len()
    }
}

/// Checks every input invariant before anything is drawn.
///
/// Checks, in order: positive counts, unique wallets, unique assets, and
/// entitlements summing to the pool size. All failures are collected.
///
/// # Errors
///
/// Returns a [`ValidationReport`] listing every problem found.
pub fn validate<'a>(
    entitlements: &'a Entitlements,
    pool: &'a ItemPool,
) -> Result<ValidatedInput<'a>, ValidationReport> {
    let mut issues = Vec::new();
    let mut counts = Vec::with_capacity(entitlements.len());

    for entitlement in entitlements.iter() {
        match usize::try_from(entitlement.count) {
            Ok(count) if count > 0 => counts.push(count),
            _ => issues.push(ValidationError::NonPositiveCount {
                wallet: entitlement.wallet.clone(),
                count: entitlement.count,
            }),
        }
    }

    for (wallet, occurrences) in repeated(entitlements.iter().map(|e| &e.wallet)) {
        issues.push(ValidationError::DuplicateWallet {
            wallet: wallet.clone(),
            occurrences,
        });
    }

    for (asset, occurrences) in repeated(pool.iter().map(|item| &item.asset)) {
        issues.push(ValidationError::DuplicateAsset {
            asset: asset.clone(),
            occurrences,
        });
    }

    let requested: i128 = entitlements.iter().map(|e| i128::from(e.count)).sum();
    let available = pool.len();
    if i128::try_from(available).map_or(true, |available| available != requested) {
        issues.push(ValidationError::SupplyMismatch {
            requested,
            available,
        });
    }

    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), "input validation failed");
        return Err(ValidationReport::new(issues));
    }

    tracing::debug!(
        wallets = entitlements.len(),
        items = available,
        "input validation passed"
    );

    Ok(ValidatedInput {
        entitlements,
        pool,
        counts,
    })
}

/// Keys that occur more than once, with their counts, in first-seen order.
fn repeated<'a, K, I>(keys: I) -> Vec<(&'a K, usize)>
where
    K: Eq + std::hash::Hash + 'a,
    I: Iterator<Item = &'a K>,
{
    let mut seen: HashMap<&K, usize> = HashMap::new();
    let mut order = Vec::new();

    for key in keys {
        let occurrences = seen.entry(key).or_insert(0);
        if *occurrences == 0 {
            order.push(key);
        }
        *occurrences += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let n = seen.get(key).copied().unwrap_or(0);
            (n > 1).then_some((key, n))
        })
        .collect()
}

/// Shuffles the whole pool with the seed and deals it out in wallet order.
///
/// Each wallet takes the next `count` items from the front of the shuffled
/// pool. The cursor only moves forward.
///
/// # Errors
///
/// Returns `InternalAllocationMismatch` if the wallets would overrun the pool
/// or leave items behind. Validated input never does.
pub fn allocate(
    input: &ValidatedInput<'_>,
    seed: &Seed,
) -> Result<AllocationResult, AllocationError> {
    let items = input.pool.items();
    let available = items.len();
    let order = permutation(seed, available);

    tracing::debug!(
        seed_digest = %seed.digest_hex(),
        items = available,
        wallets = input.counts.len(),
        "shuffled item pool"
    );

    let mut cursor = 0usize;
    let mut records = Vec::with_capacity(input.counts.len());

    for (entitlement, &count) in input.entitlements.iter().zip(&input.counts) {
        let end = match cursor.checked_add(count) {
            Some(end) if end <= available => end,
            _ => {
                return Err(AllocationError::InternalAllocationMismatch {
                    consumed: cursor.saturating_add(count),
                    available,
                })
            }
        };

        let assigned: Vec<Item> = order[cursor..end]
            .iter()
            .map(|&index| items[index].clone())
            .collect();
        records.push(AllocationRecord::new(entitlement.wallet.clone(), assigned));
        cursor = end;
    }

    if cursor != available {
        return Err(AllocationError::InternalAllocationMismatch {
            consumed: cursor,
            available,
        });
    }

    Ok(AllocationResult::new(records))
}

/// Re-checks a finished result against the inputs from scratch.
///
/// Uses only the inputs and the result itself, never the allocator's own
/// bookkeeping, so it also serves to check a published result.
///
/// # Errors
///
/// Returns the first [`VerificationError`] found. Checks run in this order:
/// wallet set, per-record counts, total, duplicates, asset set, item contents.
pub fn verify(
    entitlements: &Entitlements,
    pool: &ItemPool,
    result: &AllocationResult,
) -> Result<(), VerificationError> {
    let mut declared: HashMap<&WalletId, i64> = HashMap::with_capacity(entitlements.len());
    for entitlement in entitlements.iter() {
        declared.entry(&entitlement.wallet).or_insert(entitlement.count);
    }

    // One record per declared wallet, nothing else
    let mut present: HashSet<&WalletId> = HashSet::with_capacity(result.len());
    for record in result.iter() {
        if !declared.contains_key(&record.wallet) {
            return Err(wallet_issue(&record.wallet, WalletSetIssue::Unexpected));
        }
        if !present.insert(&record.wallet) {
            return Err(wallet_issue(&record.wallet, WalletSetIssue::Repeated));
        }
    }
    if let Some(missing) = entitlements.iter().find(|e| !present.contains(&e.wallet)) {
        return Err(wallet_issue(&missing.wallet, WalletSetIssue::Missing));
    }

    for record in result.iter() {
        if record.items.len() != record.count {
            return Err(VerificationError::RecordLengthMismatch {
                wallet: record.wallet.clone(),
                declared: record.count,
                listed: record.items.len(),
            });
        }
        let expected = declared.get(&record.wallet).copied().unwrap_or(0);
        if usize::try_from(expected).map_or(true, |expected| expected != record.count) {
            return Err(VerificationError::CountMismatch {
                wallet: record.wallet.clone(),
                expected,
                actual: record.count,
            });
        }
    }

    let allocated = result.total_items();
    if allocated != pool.len() {
        return Err(VerificationError::TotalMismatch {
            allocated,
            available: pool.len(),
        });
    }

    let mut holders: HashMap<&AssetId, &WalletId> = HashMap::with_capacity(allocated);
    for record in result.iter() {
        for item in &record.items {
            match holders.entry(&item.asset) {
                Entry::Occupied(first) => {
                    return Err(VerificationError::DuplicateInOutput {
                        asset: item.asset.clone(),
                        first: (*first.get()).clone(),
                        second: record.wallet.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(&record.wallet);
                }
            }
        }
    }

    let by_asset: HashMap<&AssetId, &Item> = pool.iter().map(|item| (&item.asset, item)).collect();
    let missing: Vec<AssetId> = pool
        .iter()
        .filter(|item| !holders.contains_key(&item.asset))
        .map(|item| item.asset.clone())
        .collect();
    let invented: Vec<AssetId> = result
        .iter()
        .flat_map(|record| &record.items)
        .filter(|item| !by_asset.contains_key(&item.asset))
        .map(|item| item.asset.clone())
        .collect();
    if !missing.is_empty() || !invented.is_empty() {
        return Err(VerificationError::AssetSetMismatch { missing, invented });
    }

    for item in result.iter().flat_map(|record| &record.items) {
        if by_asset.get(&item.asset).map_or(true, |pooled| *pooled != item) {
            return Err(VerificationError::ItemMismatch {
                asset: item.asset.clone(),
            });
        }
    }

    tracing::debug!(wallets = result.len(), items = allocated, "allocation verified");
    Ok(())
}

fn wallet_issue(wallet: &WalletId, kind: WalletSetIssue) -> VerificationError {
    VerificationError::WalletSetMismatch {
        wallet: wallet.clone(),
        kind,
    }
}

/// Validate, allocate and verify as one all-or-nothing step.
///
/// # Errors
///
/// Any failure of the three stages. No partial result is ever returned.
pub fn run(
    entitlements: &Entitlements,
    pool: &ItemPool,
    seed: &Seed,
) -> AllotmentResult<AllocationResult> {
    let input = validate(entitlements, pool)?;
    let result = allocate(&input, seed)?;
    verify(entitlements, pool, &result)?;
    Ok(result)
}
