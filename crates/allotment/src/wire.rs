//! # Wire Formats
//!
//! JSON in, JSON out.
//!
//! - Wallet file: `{"<wallet>": <count>, ...}` in distribution order
//! - Asset file: `[...]` or `{"assets": [...]}`; each entry is an asset id
//!   string or an object with `asset`, optional `rarity` and free attributes
//! - Allocation file: see [`AllocationFile`]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use allotment_core::{
    AllocationResult, AssetId, AssetRecord, Entitlements, Seed, PROTOCOL_ID,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors while reading or writing the JSON files.
#[derive(Debug, Error)]
pub enum WireError {
    /// The file could not be read or written.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File concerned.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        /// File concerned.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The allocation was produced under another protocol.
    #[error("allocation was produced by protocol {found}, expected {}", PROTOCOL_ID)]
    ProtocolMismatch {
        /// Protocol id in the file.
        found: String,
    },

    /// The allocation was produced from another seed.
    #[error("allocation seed {found:?} does not match the configured seed {expected:?}")]
    SeedMismatch {
        /// Configured seed.
        expected: String,
        /// Seed in the file.
        found: String,
    },

    /// The published digest is not the digest of the published seed.
    #[error("seed digest {found} does not match SHA-256 of the seed ({expected})")]
    DigestMismatch {
        /// Digest of the configured seed.
        expected: String,
        /// Digest in the file.
        found: String,
    },

    /// A header total disagrees with the records.
    #[error("header field {field} says {header}, records give {actual}")]
    HeaderTotalMismatch {
        /// Header field name.
        field: &'static str,
        /// Value in the header.
        header: usize,
        /// Value computed from the records.
        actual: usize,
    },
}

/// One entry of the asset file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssetEntry {
    Id(AssetId),
    Record(AssetRecord),
}

impl From<AssetEntry> for AssetRecord {
    fn from(entry: AssetEntry) -> Self {
        match entry {
            AssetEntry::Id(asset) => AssetRecord::bare(asset),
            AssetEntry::Record(record) => record,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssetFile {
    List(Vec<AssetEntry>),
    Wrapped { assets: Vec<AssetEntry> },
}

/// The published allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationFile {
    /// Protocol id the allocation was produced under.
    pub protocol: String,
    /// The public seed.
    pub seed: Seed,
    /// Hex SHA-256 of the seed.
    pub seed_digest: String,
    /// One record per wallet, in declaration order.
    pub allocations: AllocationResult,
    /// Number of records.
    pub total_wallets: usize,
    /// Number of items handed out.
    pub total_nfts_allocated: usize,
}

impl AllocationFile {
    /// Wraps a result with its header.
    #[must_use]
    pub fn new(seed: &Seed, allocations: AllocationResult) -> Self {
        Self {
            protocol: PROTOCOL_ID.to_owned(),
            seed: seed.clone(),
            seed_digest: seed.digest_hex(),
            total_wallets: allocations.len(),
            total_nfts_allocated: allocations.total_items(),
            allocations,
        }
    }

    /// Checks the header against the configured seed and the records.
    ///
    /// # Errors
    ///
    /// Returns the first header field that is wrong.
    pub fn check_header(&self, seed: &Seed) -> Result<(), WireError> {
        if self.protocol != PROTOCOL_ID {
            return Err(WireError::ProtocolMismatch {
                found: self.protocol.clone(),
            });
        }
        if &self.seed != seed {
            return Err(WireError::SeedMismatch {
                expected: seed.to_string(),
                found: self.seed.to_string(),
            });
        }
        let expected = seed.digest_hex();
        if !self.seed_digest.eq_ignore_ascii_case(&expected) {
            return Err(WireError::DigestMismatch {
                expected,
                found: self.seed_digest.clone(),
            });
        }
        if self.total_wallets != self.allocations.len() {
            return Err(WireError::HeaderTotalMismatch {
                field: "total_wallets",
                header: self.total_wallets,
                actual: self.allocations.len(),
            });
        }
        let listed: usize = self.allocations.iter().map(|r| r.items.len()).sum();
        if self.total_nfts_allocated != listed {
            return Err(WireError::HeaderTotalMismatch {
                field: "total_nfts_allocated",
                header: self.total_nfts_allocated,
                actual: listed,
            });
        }
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> WireError {
    let path = path.to_path_buf();
    move |source| WireError::Io { path, source }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, WireError> {
    let bytes = fs::read(path).map_err(io_error(path))?;
    serde_json::from_slice(&bytes).map_err(|source| WireError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the wallet file, keeping declaration order and repeated wallets.
///
/// # Errors
///
/// Returns an error if the file is unreadable or not a wallet -> integer map.
pub fn load_entitlements(path: &Path) -> Result<Entitlements, WireError> {
    read_json(path)
}

/// Reads the asset file in input order.
///
/// # Errors
///
/// Returns an error if the file is unreadable or has an unknown shape.
pub fn load_asset_records(path: &Path) -> Result<Vec<AssetRecord>, WireError> {
    let entries = match read_json::<AssetFile>(path)? {
        AssetFile::List(entries) | AssetFile::Wrapped { assets: entries } => entries,
    };
    Ok(entries.into_iter().map(AssetRecord::from).collect())
}

/// Reads a published allocation.
///
/// # Errors
///
/// Returns an error if the file is unreadable or malformed.
pub fn read_allocation(path: &Path) -> Result<AllocationFile, WireError> {
    read_json(path)
}

/// Writes pretty JSON to a sibling temp file, then renames it over `path`.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails. The
/// target is left untouched in that case.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), WireError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| WireError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(&json)?;
        file.write_all(b"\n")?;
        file.sync_all()
    });

    // The temp file never outlives a failed write or rename
    if let Err(err) = written.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error(path)(err));
    }
    Ok(())
}
