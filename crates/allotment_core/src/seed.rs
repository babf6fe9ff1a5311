//! # Seeded Shuffle
//!
//! **The generator and shuffle are protocol.** Anyone re-running an allocation
//! from the published seed must reproduce it bit for bit, so nothing here may
//! change without changing [`PROTOCOL_ID`].
//!
//! ## Protocol `allotment/sha256-chacha20-fisher-yates/v1`
//!
//! ```text
//! digest  = SHA-256(seed as UTF-8)                      32 bytes
//! rng     = ChaCha20(key = digest, counter = 0, stream = 0)
//! draw    = w[k] | w[k+1] << 32                         little-endian u32 words
//! below n = first draw x with x < MAX - MAX % n, then x % n
//! shuffle = for i in (1..len).rev(): swap(i, below(i + 1))
//! ```
//!
//! The shuffle runs over the whole pool at once. It never depends on how many
//! wallets there are or how much each one receives.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Identifier of the generator + shuffle combination implemented here.
pub const PROTOCOL_ID: &str = "allotment/sha256-chacha20-fisher-yates/v1";

/// Public seed from which the whole allocation is derived.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    /// Creates a seed from its public string form.
    #[must_use]
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// The seed exactly as published.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// SHA-256 of the seed's UTF-8 bytes. This is the generator key.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.0.as_bytes()).into()
    }

    /// Lowercase hex of [`Seed::digest`], published next to the seed.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        Self::new(seed)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The protocol's deterministic generator.
///
/// Newtype over [`ChaCha20Rng`] so only the pinned draw and shuffle
/// operations are reachable.
pub struct SeedRng(ChaCha20Rng);

impl SeedRng {
    /// Keys the generator with the seed digest.
    #[must_use]
    pub fn from_seed(seed: &Seed) -> Self {
        Self(ChaCha20Rng::from_seed(seed.digest()))
    }

    /// Next raw 64-bit draw.
    pub fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    /// Uniform index in `0..bound` using rejection sampling.
    ///
    /// `bound` must be at least 1; a zero bound is treated as 1.
    pub fn below(&mut self, bound: usize) -> usize {
        let n = bound.max(1) as u64;
        // Largest multiple of n that fits, so every residue is equally likely
        let zone = u64::MAX - (u64::MAX % n);
        loop {
            let x = self.next_u64();
            if x < zone {
                #[allow(clippy::cast_possible_truncation)]
                return (x % n) as usize; // < bound, fits usize
            }
        }
    }

    /// Fisher-Yates shuffle in place, highest index first.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.below(i + 1);
            slice.swap(i, j);
        }
    }
}

impl fmt::Debug for SeedRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedRng")
            .field("protocol", &PROTOCOL_ID)
            .finish_non_exhaustive()
    }
}

/// The protocol permutation of `0..len` for `seed`.
///
/// Position `k` of the shuffled pool holds the input item at index
/// `permutation[k]`.
#[must_use]
pub fn permutation(seed: &Seed, len: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    SeedRng::from_seed(seed).shuffle(&mut order);
    order
}
