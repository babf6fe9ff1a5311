//! Aggregate figures for a finished allocation. Reporting only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::AllocationResult;

/// Distribution overview of an [`AllocationResult`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    /// Number of wallets served.
    pub total_wallets: usize,
    /// Number of items handed out.
    pub total_items: usize,
    /// Items per rarity label.
    pub by_rarity: BTreeMap<String, usize>,
    /// Number of wallets that received exactly `k` items, keyed by `k`.
    pub by_count: BTreeMap<usize, usize>,
}

impl AllocationSummary {
    /// Tallies a result.
    #[must_use]
    pub fn from_result(result: &AllocationResult) -> Self {
        let mut summary = Self {
            total_wallets: result.len(),
            ..Self::default()
        };

        for record in result.iter() {
            summary.total_items += record.items.len();
            *summary.by_count.entry(record.items.len()).or_insert(0) += 1;
            for item in &record.items {
                *summary.by_rarity.entry(item.rarity.clone()).or_insert(0) += 1;
            }
        }

        summary
    }
}
