//! # Rarity Assignment
//!
//! Builds the [`ItemPool`] from supplied asset records.
//!
//! Records either all carry a rarity label (used as-is) or none do, in which
//! case labels come from configured weights in basis points
//! (10000 = 100%, integers only). Assignment is positional and consumes no
//! randomness: the pool shuffle alone decides who receives which item.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::RarityError;
use crate::types::{AssetRecord, Item, ItemPool};

/// 100% in basis points.
pub const BASIS_POINTS: u64 = 10_000;

/// Rarity weights, keyed and processed in lexicographic name order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>")]
pub struct RarityWeights {
    weights: BTreeMap<String, u32>,
}

impl RarityWeights {
    /// Creates weights that must sum to exactly [`BASIS_POINTS`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidWeights` if the sum is anything else (an empty table
    /// sums to zero).
    pub fn new(weights: BTreeMap<String, u32>) -> Result<Self, RarityError> {
        let total_bp: u64 = weights.values().map(|&bp| u64::from(bp)).sum();
        if total_bp != BASIS_POINTS {
            return Err(RarityError::InvalidWeights { total_bp });
        }
        Ok(Self { weights })
    }

    /// Weight of one rarity, in basis points.
    #[must_use]
    pub fn weight(&self, rarity: &str) -> Option<u32> {
        self.weights.get(rarity).copied()
    }

    /// How many of `total` items each rarity receives.
    ///
    /// Every rarity but the last gets `floor(total * bp / 10000)`; the last
    /// takes the remainder so the quotas always sum to `total`.
    #[must_use]
    pub fn quotas(&self, total: usize) -> Vec<(&str, usize)> {
        let mut remaining = total;
        let last = self.weights.len().saturating_sub(1);

        self.weights
            .iter()
            .enumerate()
            .map(|(i, (rarity, &bp))| {
                let quota = if i == last {
                    remaining
                } else {
                    let share = total as u128 * u128::from(bp) / u128::from(BASIS_POINTS);
                    // share <= total because the weights sum to 100%
                    let share = usize::try_from(share).unwrap_or(total).min(remaining);
                    remaining -= share;
                    share
                };
                (rarity.as_str(), quota)
            })
            .collect()
    }
}

impl TryFrom<BTreeMap<String, u32>> for RarityWeights {
    type Error = RarityError;

    fn try_from(weights: BTreeMap<String, u32>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

/// Settles rarity labels and returns the pool in input order.
///
/// # Errors
///
/// - `PartiallyLabelled` if only some records carry a rarity
/// - `MissingWeights` if none do and `weights` is `None`
pub fn build_pool(
    records: Vec<AssetRecord>,
    weights: Option<&RarityWeights>,
) -> Result<ItemPool, RarityError> {
    let total = records.len();
    let labelled = records.iter().filter(|r| r.rarity.is_some()).count();

    if labelled == total {
        tracing::debug!(total, "using pre-assigned rarities");
        return Ok(records
            .into_iter()
            .filter_map(|r| {
                let rarity = r.rarity?;
                Some(Item {
                    asset: r.asset,
                    rarity,
                    attributes: r.attributes,
                })
            })
            .collect());
    }

    if labelled > 0 {
        return Err(RarityError::PartiallyLabelled { labelled, total });
    }

    let weights = weights.ok_or(RarityError::MissingWeights)?;
    let labels = weights
        .quotas(total)
        .into_iter()
        .flat_map(|(rarity, quota)| std::iter::repeat(rarity).take(quota));

    tracing::debug!(total, rarities = weights.weights.len(), "assigning rarities from weights");

    Ok(records
        .into_iter()
        .zip(labels)
        .map(|(r, rarity)| Item {
            asset: r.asset,
            rarity: rarity.to_owned(),
            attributes: r.attributes,
        })
        .collect())
}
