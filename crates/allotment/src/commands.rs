//! `allocate` and `verify`.
//!
//! Both commands load the same inputs the same way. `allocate` writes the
//! output only after the engine's own verification passed; `verify` never
//! writes anything.

use std::path::Path;

use allotment_core::{build_pool, reproduce, run, AllocationSummary, Entitlements, ItemPool};
use anyhow::{Context, Result};

use crate::config::AllotmentConfig;
use crate::wire::{
    load_asset_records, load_entitlements, read_allocation, write_json_atomic, AllocationFile,
};

/// Reads wallets and assets and settles rarity labels.
///
/// # Errors
///
/// Returns an error if either file cannot be loaded or the labels cannot be settled.
pub fn load_inputs(config: &AllotmentConfig) -> Result<(Entitlements, ItemPool)> {
    let entitlements = load_entitlements(&config.wallets_file).context("failed to load wallets")?;
    let records = load_asset_records(&config.assets_file).context("failed to load assets")?;
    let pool = build_pool(records, config.rarity_bp.as_ref()).context("failed to settle rarities")?;

    tracing::info!(
        wallets = entitlements.len(),
        items = pool.len(),
        "loaded inputs"
    );
    Ok((entitlements, pool))
}

/// Runs the allocation and writes it to the configured output file.
///
/// # Errors
///
/// Any load, validation, allocation, verification or write failure. The
/// output file is not created or replaced on failure.
pub fn allocate(config: &AllotmentConfig) -> Result<AllocationSummary> {
    let (entitlements, pool) = load_inputs(config)?;

    tracing::info!(
        seed = %config.seed,
        seed_digest = %config.seed.digest_hex(),
        "allocating"
    );
    let result = run(&entitlements, &pool, &config.seed).context("allocation failed")?;
    let summary = AllocationSummary::from_result(&result);

    let file = AllocationFile::new(&config.seed, result);
    write_json_atomic(&config.output_file, &file).context("failed to write allocation")?;

    tracing::info!(path = %config.output_file.display(), "allocation written");
    log_summary(&summary);
    Ok(summary)
}

/// Audits a published allocation against the configured inputs and seed.
///
/// Reads `allocation`, or the configured output file if `None`.
///
/// # Errors
///
/// Any load failure, a wrong header, or a result the seed does not reproduce.
pub fn verify(config: &AllotmentConfig, allocation: Option<&Path>) -> Result<AllocationSummary> {
    let path = allocation.unwrap_or(config.output_file.as_path());
    let (entitlements, pool) = load_inputs(config)?;

    let published = read_allocation(path).context("failed to read allocation")?;
    published
        .check_header(&config.seed)
        .context("allocation header is wrong")?;
    reproduce(&entitlements, &pool, &config.seed, &published.allocations)
        .context("allocation does not reproduce")?;

    tracing::info!(path = %path.display(), "allocation reproduced from seed");
    let summary = AllocationSummary::from_result(&published.allocations);
    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &AllocationSummary) {
    tracing::info!(
        wallets = summary.total_wallets,
        items = summary.total_items,
        "allocation summary"
    );
    for (rarity, count) in &summary.by_rarity {
        tracing::info!(%rarity, count, "items by rarity");
    }
    for (received, wallets) in &summary.by_count {
        tracing::info!(received, wallets, "wallets by items received");
    }
}
