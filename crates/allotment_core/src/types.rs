//! # Allotment Data Model
//!
//! Inputs (entitlements, item pool) are immutable once built. The result is
//! constructed once per run and handed to the caller for serialization.
//!
//! Serde representations here ARE the wire format. Field names such as
//! `nfts` and `total_nfts` are part of the published file layout.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Opaque wallet identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    /// Creates a wallet identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WalletId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for WalletId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque asset identifier. Unique across an item pool.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Creates an asset identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declared wallet and the number of items it must receive.
///
/// The count is kept exactly as declared (signed) so that zero and negative
/// values reach validation instead of failing somewhere less specific.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entitlement {
    /// The receiving wallet.
    pub wallet: WalletId,
    /// Declared number of items.
    pub count: i64,
}

/// Wallet entitlements in declaration order.
///
/// Declaration order is the distribution order. Duplicate wallets are kept
/// (not merged) so validation can reject them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entitlements {
    entries: Vec<Entitlement>,
}

impl Entitlements {
    /// Creates an empty set of entitlements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a wallet at the end of the distribution order.
    pub fn push(&mut self, wallet: impl Into<WalletId>, count: i64) {
        self.entries.push(Entitlement {
            wallet: wallet.into(),
            count,
        });
    }

    /// Entitlements in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Entitlement> {
        self.entries.iter()
    }

    /// Number of declarations (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no wallet is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared count of the first declaration of `wallet`.
    #[must_use]
    pub fn count_of(&self, wallet: &WalletId) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| &e.wallet == wallet)
            .map(|e| e.count)
    }
}

impl<W: Into<WalletId>> FromIterator<(W, i64)> for Entitlements {
    fn from_iter<I: IntoIterator<Item = (W, i64)>>(iter: I) -> Self {
        let mut entitlements = Self::new();
        for (wallet, count) in iter {
            entitlements.push(wallet, count);
        }
        entitlements
    }
}

impl Serialize for Entitlements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.wallet, &entry.count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entitlements {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntitlementsVisitor;

        impl<'de> Visitor<'de> for EntitlementsVisitor {
            type Value = Entitlements;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of wallet identifiers to integer item counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                // Entries arrive in document order, repeated keys included
                while let Some((wallet, count)) = map.next_entry::<WalletId, i64>()? {
                    entries.push(Entitlement { wallet, count });
                }
                Ok(Entitlements { entries })
            }
        }

        deserializer.deserialize_map(EntitlementsVisitor)
    }
}

/// An asset record as supplied, before rarity labels are settled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Asset identifier.
    pub asset: AssetId,
    /// Rarity label, if the supplier assigned one. An empty label counts as none.
    #[serde(default, deserialize_with = "non_empty_label")]
    pub rarity: Option<String>,
    /// Any other fields, carried through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl AssetRecord {
    /// Creates a record with no rarity and no extra attributes.
    #[must_use]
    pub fn bare(asset: impl Into<AssetId>) -> Self {
        Self {
            asset: asset.into(),
            rarity: None,
            attributes: Map::new(),
        }
    }

    /// Creates a record with a rarity label.
    #[must_use]
    pub fn labelled(asset: impl Into<AssetId>, rarity: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            rarity: Some(rarity.into()),
            attributes: Map::new(),
        }
    }
}

fn non_empty_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|label| !label.is_empty()))
}

/// A unique item in the pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Asset identifier (the item's identity).
    pub asset: AssetId,
    /// Rarity label.
    pub rarity: String,
    /// Any other fields, carried through untouched.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Item {
    /// Creates an item with no extra attributes.
    #[must_use]
    pub fn new(asset: impl Into<AssetId>, rarity: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            rarity: rarity.into(),
            attributes: Map::new(),
        }
    }
}

/// The full supply, in input order.
///
/// Input order is the pre-shuffle order; the shuffle is only reproducible
/// relative to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemPool {
    items: Vec<Item>,
}

impl ItemPool {
    /// Creates a pool from items in input order.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Items in input order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterates items in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Total supply.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the pool holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Item>> for ItemPool {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<Item> for ItemPool {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// The items assigned to one wallet, in shuffled order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// The receiving wallet.
    pub wallet: WalletId,
    /// Assigned items in the order they were drawn.
    #[serde(rename = "nfts")]
    pub items: Vec<Item>,
    /// Number of assigned items.
    #[serde(rename = "total_nfts")]
    pub count: usize,
}

impl AllocationRecord {
    /// Creates a record whose count matches its item list.
    #[must_use]
    pub fn new(wallet: WalletId, items: Vec<Item>) -> Self {
        let count = items.len();
        Self {
            wallet,
            items,
            count,
        }
    }
}

/// One record per wallet, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationResult {
    records: Vec<AllocationRecord>,
}

impl AllocationResult {
    /// Wraps finished records.
    #[must_use]
    pub fn new(records: Vec<AllocationRecord>) -> Self {
        Self { records }
    }

    /// Records in wallet declaration order.
    #[must_use]
    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    /// Iterates records in wallet declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record for `wallet`, if any.
    #[must_use]
    pub fn record(&self, wallet: &WalletId) -> Option<&AllocationRecord> {
        self.records.iter().find(|r| &r.wallet == wallet)
    }

    /// Sum of the records' declared counts.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.records
            .iter()
            .fold(0usize, |total, r| total.saturating_add(r.count))
    }

    /// Consumes the result, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<AllocationRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entitlements_keep_declaration_order() {
        let json = r#"{"zeta": 2, "alpha": 1, "mid": 3}"#;
        let parsed: Entitlements = serde_json::from_str(json).unwrap();

        let wallets: Vec<&str> = parsed.iter().map(|e| e.wallet.as_str()).collect();
        assert_eq!(wallets, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_entitlements_keep_duplicate_keys() {
        let json = r#"{"w1": 2, "w2": 1, "w1": 5}"#;
        let parsed: Entitlements = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.count_of(&WalletId::from("w1")), Some(2));
    }

    #[test]
    fn test_entitlements_accept_non_positive_counts() {
        let json = r#"{"w1": 0, "w2": -4}"#;
        let parsed: Entitlements = serde_json::from_str(json).unwrap();

        let counts: Vec<i64> = parsed.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![0, -4]);
    }

    #[test]
    fn test_entitlements_reject_fractional_counts() {
        let json = r#"{"w1": 1.5}"#;
        assert!(serde_json::from_str::<Entitlements>(json).is_err());
    }

    #[test]
    fn test_entitlements_serialize_in_order() {
        let entitlements: Entitlements = [("b", 1), ("a", 2)].into_iter().collect();
        let json = serde_json::to_string(&entitlements).unwrap();
        assert_eq!(json, r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_item_carries_extra_attributes() {
        let json = r#"{"asset": "nft-1", "rarity": "Rare", "edition": 7}"#;
        let item: Item = serde_json::from_str(json).unwrap();

        assert_eq!(item.asset.as_str(), "nft-1");
        assert_eq!(item.rarity, "Rare");
        assert_eq!(item.attributes.get("edition"), Some(&Value::from(7)));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["edition"], Value::from(7));
    }

    #[test]
    fn test_empty_rarity_is_unlabelled() {
        let records: Vec<AssetRecord> = serde_json::from_str(
            r#"[{"asset": "a", "rarity": ""}, {"asset": "b", "rarity": null}, {"asset": "c"}]"#,
        )
        .unwrap();

        assert!(records.iter().all(|r| r.rarity.is_none()));
        assert_eq!(records[0], AssetRecord::bare("a"));
    }

    #[test]
    fn test_record_wire_names() {
        let record = AllocationRecord::new(WalletId::from("w1"), vec![Item::new("a", "Common")]);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["wallet"], "w1");
        assert_eq!(value["total_nfts"], 1);
        assert_eq!(value["nfts"][0]["asset"], "a");
        assert_eq!(value["nfts"][0]["rarity"], "Common");
    }
}
