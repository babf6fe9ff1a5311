//! Integration test for the file pipeline: config -> JSON inputs -> allocation file.

use std::fs;
use std::path::{Path, PathBuf};

use allotment::commands::{allocate, verify};
use allotment::{AllocationFile, AllotmentConfig};
use allotment_core::PROTOCOL_ID;

fn temp_run_dir(name: &str) -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("test_allotment_{name}_{id}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Three wallets {2, 1, 2} and five labelled assets, seed "test-1".
fn scenario(name: &str) -> (PathBuf, AllotmentConfig) {
    let dir = temp_run_dir(name);
    write(&dir, "allotment.toml", r#"seed = "test-1""#);
    write(&dir, "eligible_wallets.json", r#"{"w1": 2, "w2": 1, "w3": 2}"#);
    write(
        &dir,
        "nft_assets.json",
        r#"[
            {"asset": "nft-0", "rarity": "Common"},
            {"asset": "nft-1", "rarity": "Common"},
            {"asset": "nft-2", "rarity": "Rare", "edition": 1},
            {"asset": "nft-3", "rarity": "Common"},
            {"asset": "nft-4", "rarity": "Legendary"}
        ]"#,
    );
    let config = AllotmentConfig::load(&dir.join("allotment.toml")).unwrap();
    (dir, config)
}

fn read_output(config: &AllotmentConfig) -> AllocationFile {
    serde_json::from_slice(&fs::read(&config.output_file).unwrap()).unwrap()
}

#[test]
fn test_allocate_writes_verified_file() {
    let (dir, config) = scenario("allocate");

    let summary = allocate(&config).unwrap();
    assert_eq!(summary.total_wallets, 3);
    assert_eq!(summary.total_items, 5);

    let file = read_output(&config);
    assert_eq!(file.protocol, PROTOCOL_ID);
    assert_eq!(
        file.seed_digest,
        "ed1e1dcf971990c1b89676ae785436106f7548b1ae41d174ca9d3bfb9661a477"
    );
    assert_eq!(file.total_nfts_allocated, 5);

    let w3: Vec<&str> = file.allocations.records()[2]
        .items
        .iter()
        .map(|i| i.asset.as_str())
        .collect();
    assert_eq!(w3, vec!["nft-2", "nft-0"]);
    // Extra attributes survive the round trip
    assert_eq!(
        file.allocations.records()[2].items[0].attributes.get("edition"),
        Some(&serde_json::Value::from(1))
    );

    assert!(!dir.join("nft_allocation.json.tmp").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_allocate_then_verify() {
    let (dir, config) = scenario("roundtrip");

    allocate(&config).unwrap();
    assert!(verify(&config, None).is_ok());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_verify_rejects_tampered_file() {
    let (dir, config) = scenario("tampered");
    allocate(&config).unwrap();

    // Swap the first two items of w1: still a valid partition, but not this seed's
    let mut file = read_output(&config);
    let mut records = file.allocations.into_records();
    records[0].items.swap(0, 1);
    file.allocations = allotment_core::AllocationResult::new(records);
    let tampered = dir.join("tampered.json");
    fs::write(&tampered, serde_json::to_vec_pretty(&file).unwrap()).unwrap();

    let err = verify(&config, Some(&tampered)).unwrap_err();
    assert!(format!("{err:#}").contains("does not reproduce"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_verify_rejects_other_seed() {
    let (dir, config) = scenario("other_seed");
    allocate(&config).unwrap();

    let mut other = config.clone();
    other.seed = allotment_core::Seed::new("test-2");
    let err = verify(&other, Some(&config.output_file)).unwrap_err();
    assert!(format!("{err:#}").contains("header"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_run_writes_nothing() {
    let (dir, config) = scenario("supply");
    write(&dir, "eligible_wallets.json", r#"{"w1": 2, "w2": 1, "w3": 1}"#);

    let err = allocate(&config).unwrap_err();
    assert!(format!("{err:#}").contains("4 items but the pool holds 5"));
    assert!(!config.output_file.exists());
    assert!(!dir.join("nft_allocation.json.tmp").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_run_keeps_previous_output() {
    let (dir, config) = scenario("keep");
    allocate(&config).unwrap();
    let before = fs::read(&config.output_file).unwrap();

    write(&dir, "nft_assets.json", r#"["nft-0", "nft-0", "nft-1", "nft-2", "nft-3"]"#);
    let mut weighted = config.clone();
    weighted.rarity_bp = Some(
        serde_json::from_str(r#"{"Common": 10000}"#).unwrap(),
    );
    assert!(allocate(&weighted).is_err());
    assert_eq!(fs::read(&config.output_file).unwrap(), before);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_unlabelled_assets_use_weights() {
    let dir = temp_run_dir("weights");
    write(
        &dir,
        "allotment.toml",
        r#"
            seed = "weights"
            wallets_file = "wallets.json"
            assets_file = "assets.json"
            output_file = "out/allocation.json"

            [rarity_bp]
            Common = 7500
            Rare = 2500
        "#,
    );
    write(&dir, "wallets.json", r#"{"a": 3, "b": 1}"#);
    write(&dir, "assets.json", r#"{"assets": ["n0", "n1", "n2", "n3"]}"#);
    fs::create_dir_all(dir.join("out")).unwrap();

    let config = AllotmentConfig::load(&dir.join("allotment.toml")).unwrap();
    let summary = allocate(&config).unwrap();

    assert_eq!(summary.by_rarity.get("Common"), Some(&3));
    assert_eq!(summary.by_rarity.get("Rare"), Some(&1));
    assert!(dir.join("out/allocation.json").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_duplicate_wallet_keys_are_rejected() {
    let (dir, config) = scenario("dup_wallet");
    write(&dir, "eligible_wallets.json", r#"{"w1": 2, "w2": 1, "w1": 2}"#);

    let err = allocate(&config).unwrap_err();
    assert!(format!("{err:#}").contains("wallet w1 is declared 2 times"));

    let _ = fs::remove_dir_all(&dir);
}
