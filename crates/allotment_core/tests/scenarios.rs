//! # Allocation Scenarios
//!
//! End-to-end behaviour of the engine through its public API:
//!
//! 1. **Determinism** - same inputs and seed give the same result
//! 2. **Supply checks** - mismatched supply and duplicates stop before shuffling
//! 3. **Seed sensitivity** - different seeds give different assignments
//! 4. **Pinned output** - a known seed deals a known allocation
//!
//! Run with: cargo test --package allotment_core --test scenarios

use allotment_core::{
    run, validate, AllotmentError, AssetId, Entitlements, Item, ItemPool, Seed, ValidationError,
    WalletId,
};

fn five_items() -> ItemPool {
    (0..5).map(|i| Item::new(format!("nft-{i}"), "Common")).collect()
}

fn three_wallets() -> Entitlements {
    [("w1", 2), ("w2", 1), ("w3", 2)].into_iter().collect()
}

fn assets_of(result: &allotment_core::AllocationResult, wallet: &str) -> Vec<String> {
    result
        .record(&WalletId::from(wallet))
        .map(|r| r.items.iter().map(|i| i.asset.to_string()).collect())
        .unwrap_or_default()
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn repeated_runs_are_identical() {
    let entitlements = three_wallets();
    let pool = five_items();
    let seed = Seed::new("test-1");

    let first = run(&entitlements, &pool, &seed).unwrap();
    let second = run(&entitlements, &pool, &seed).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_items(), 5);

    let mut assets: Vec<AssetId> = first
        .iter()
        .flat_map(|r| &r.items)
        .map(|i| i.asset.clone())
        .collect();
    assets.sort();
    assets.dedup();
    assert_eq!(assets.len(), 5, "no asset may be handed out twice");
}

#[test]
fn known_seed_deals_known_allocation() {
    let result = run(&three_wallets(), &five_items(), &Seed::new("test-1")).unwrap();

    assert_eq!(assets_of(&result, "w1"), vec!["nft-3", "nft-1"]);
    assert_eq!(assets_of(&result, "w2"), vec!["nft-4"]);
    assert_eq!(assets_of(&result, "w3"), vec!["nft-2", "nft-0"]);
}

#[test]
fn records_follow_declaration_order() {
    let entitlements: Entitlements = [("zeta", 1), ("alpha", 3), ("mid", 1)].into_iter().collect();
    let result = run(&entitlements, &five_items(), &Seed::new("order")).unwrap();

    let wallets: Vec<&str> = result.iter().map(|r| r.wallet.as_str()).collect();
    assert_eq!(wallets, vec!["zeta", "alpha", "mid"]);
}

// ============================================================================
// SUPPLY AND UNIQUENESS CHECKS
// ============================================================================

#[test]
fn supply_short_by_one_is_rejected() {
    let entitlements: Entitlements = (0..9)
        .map(|i| (format!("w{i}"), 11))
        .collect();
    let pool: ItemPool = (0..100).map(|i| Item::new(format!("nft-{i}"), "Common")).collect();

    let report = validate(&entitlements, &pool).unwrap_err();
    assert_eq!(
        report.issues(),
        &[ValidationError::SupplyMismatch {
            requested: 99,
            available: 100
        }]
    );
}

#[test]
fn duplicate_asset_is_rejected_before_shuffling() {
    let entitlements: Entitlements = [("w1", 3)].into_iter().collect();
    let pool = ItemPool::new(vec![
        Item::new("nft-0", "Common"),
        Item::new("nft-1", "Common"),
        Item::new("nft-0", "Rare"),
    ]);

    let err = run(&entitlements, &pool, &Seed::new("dup")).unwrap_err();
    match err {
        AllotmentError::Validation(report) => {
            assert!(report.contains(&ValidationError::DuplicateAsset {
                asset: AssetId::from("nft-0"),
                occurrences: 2,
            }));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn non_positive_count_is_rejected() {
    let entitlements: Entitlements = [("w1", 0), ("w2", 5)].into_iter().collect();
    let report = validate(&entitlements, &five_items()).unwrap_err();

    assert!(report.contains(&ValidationError::NonPositiveCount {
        wallet: WalletId::from("w1"),
        count: 0,
    }));
}

#[test]
fn duplicate_wallet_is_rejected() {
    let entitlements: Entitlements = [("w1", 2), ("w2", 1), ("w1", 2)].into_iter().collect();
    let report = validate(&entitlements, &five_items()).unwrap_err();

    assert!(report.contains(&ValidationError::DuplicateWallet {
        wallet: WalletId::from("w1"),
        occurrences: 2,
    }));
}

// ============================================================================
// SEED SENSITIVITY
// ============================================================================

#[test]
fn different_seeds_give_different_assignments() {
    let entitlements = three_wallets();
    let pool = five_items();

    let a = run(&entitlements, &pool, &Seed::new("A")).unwrap();
    let b = run(&entitlements, &pool, &Seed::new("B")).unwrap();

    assert_ne!(a, b);
    assert_eq!(assets_of(&a, "w1"), vec!["nft-0", "nft-1"]);
    assert_eq!(assets_of(&b, "w1"), vec!["nft-1", "nft-3"]);
}

#[test]
fn many_seeds_all_conserve_the_pool() {
    let entitlements: Entitlements = [("a", 7), ("b", 1), ("c", 12), ("d", 30)].into_iter().collect();
    let pool: ItemPool = (0..50).map(|i| Item::new(format!("nft-{i}"), "Common")).collect();

    for s in 0..200 {
        let result = run(&entitlements, &pool, &Seed::new(format!("seed-{s}"))).unwrap();

        for entitlement in entitlements.iter() {
            let record = result.record(&entitlement.wallet).unwrap();
            assert_eq!(record.items.len() as i64, entitlement.count);
        }

        let mut assets: Vec<&str> = result
            .iter()
            .flat_map(|r| &r.items)
            .map(|i| i.asset.as_str())
            .collect();
        assets.sort_unstable();
        let mut expected: Vec<String> = (0..50).map(|i| format!("nft-{i}")).collect();
        expected.sort_unstable();
        assert_eq!(assets, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }
}
