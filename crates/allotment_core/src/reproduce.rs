//! Independent audit of a published allocation.
//!
//! Given the announced inputs, the published seed and the published result,
//! anyone can check that the result is what the protocol produces. The
//! structural checks run first so a malformed file is reported as such, not
//! as a mere divergence.

use crate::engine::{run, verify};
use crate::error::ReproductionError;
use crate::seed::Seed;
use crate::types::{AllocationResult, Entitlements, ItemPool};

/// Checks that `published` is exactly the allocation `seed` produces.
///
/// # Errors
///
/// - `Integrity` if the published result fails [`verify`]
/// - `Recompute` if the inputs cannot be allocated at all
/// - `WalletOrderDiverges` / `ItemsDiverge` at the first difference found
pub fn reproduce(
    entitlements: &Entitlements,
    pool: &ItemPool,
    seed: &Seed,
    published: &AllocationResult,
) -> Result<(), ReproductionError> {
    verify(entitlements, pool, published)?;

    let expected = run(entitlements, pool, seed)
        .map_err(|err| ReproductionError::Recompute(Box::new(err)))?;

    for (position, (ours, theirs)) in expected.iter().zip(published.iter()).enumerate() {
        if ours.wallet != theirs.wallet {
            return Err(ReproductionError::WalletOrderDiverges {
                position,
                expected: ours.wallet.clone(),
                published: theirs.wallet.clone(),
            });
        }
        if let Some(position) = ours
            .items
            .iter()
            .zip(&theirs.items)
            .position(|(a, b)| a.asset != b.asset)
        {
            return Err(ReproductionError::ItemsDiverge {
                wallet: ours.wallet.clone(),
                position,
            });
        }
    }

    tracing::debug!(
        seed_digest = %seed.digest_hex(),
        wallets = published.len(),
        "published allocation reproduced"
    );
    Ok(())
}
