//! # Bucket Index Module
//!
//! Locality-sensitive hashing over signature bands.
//!
//! ## How It Works
//! 1. Slice each signature's bit vector into `bands` contiguous bands of
//!    `rows = signature_len / bands` bits
//! 2. Key a bucket by the exact bit content of the band, one table per band
//! 3. Images sharing a bucket in ANY band become candidate pairs
//! 4. Only candidates are scored, not all n(n-1)/2 pairs
//!
//! ## Trade-offs
//! - More bands (shorter rows) = higher recall, more false candidates
//! - Fewer bands (longer rows) = fewer candidates, may miss duplicates
//!
//! Two images that disagree in every band can never become candidates;
//! that is the intended recall/precision trade of LSH, not a defect.

mod pair;

pub use pair::CandidatePair;

use crate::core::signature::Signature;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Default number of bands.
pub const DEFAULT_BANDS: usize = 16;

/// Bucket key: the packed bit content of one band.
type BandKey = Vec<u8>;

/// LSH index over signature bands.
///
/// The bucket tables are local to this value and are discarded with it
/// after candidate generation; nothing is shared between runs.
pub struct BandedIndex {
    bands: usize,
    rows: usize,
    /// One bucket table per band: exact band bits -> entry indices.
    band_tables: Vec<HashMap<BandKey, Vec<usize>>>,
    entries: Vec<(PathBuf, Signature)>,
}

impl BandedIndex {
    /// Create an empty index for signatures of `signature_len` bits.
    ///
    /// `rows` is the integer quotient `signature_len / bands`; when the
    /// division is inexact the trailing `signature_len - bands * rows` bits
    /// of every signature are excluded from banding (they still count
    /// toward the similarity score).
    pub fn new(bands: usize, signature_len: usize) -> Self {
        let rows = if bands == 0 { 0 } else { signature_len / bands };
        Self {
            bands,
            rows,
            band_tables: (0..bands).map(|_| HashMap::new()).collect(),
            entries: Vec::new(),
        }
    }

    /// Build an index from a collection of signatures.
    pub fn build(
        bands: usize,
        signature_len: usize,
        entries: Vec<(PathBuf, Signature)>,
    ) -> Self {
        let mut index = Self::new(bands, signature_len);
        for (path, signature) in entries {
            index.insert(path, signature);
        }
        index
    }

    /// Add one image's signature to every band table.
    pub fn insert(&mut self, path: PathBuf, signature: Signature) {
        let entry_idx = self.entries.len();
        let bits = signature.bits();

        for band_idx in 0..self.bands {
            let start = band_idx * self.rows;
            let end = start + self.rows;
            if end > bits.len() {
                break;
            }
            let key = pack_band(&bits[start..end]);
            self.band_tables[band_idx]
                .entry(key)
                .or_default()
                .push(entry_idx);
        }

        self.entries.push((path, signature));
    }

    /// Number of bands.
    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Bits per band.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of indexed images.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derive the deduplicated candidate-pair set.
    ///
    /// Every bucket with two or more members contributes all its unordered
    /// pairs, members sorted canonically first; the shared set counts a
    /// pair colliding in several bands once.
    pub fn candidate_pairs(&self) -> HashSet<CandidatePair> {
        let mut pairs = HashSet::new();

        for band_table in &self.band_tables {
            for bucket in band_table.values() {
                if bucket.len() < 2 {
                    continue;
                }
                let mut members: Vec<&PathBuf> =
                    bucket.iter().map(|&idx| &self.entries[idx].0).collect();
                members.sort();
                for i in 0..members.len() {
                    for j in (i + 1)..members.len() {
                        pairs.insert(CandidatePair::new(members[i].clone(), members[j].clone()));
                    }
                }
            }
        }

        pairs
    }

    /// Occupancy and reduction statistics, for diagnostics.
    pub fn stats(&self) -> IndexStats {
        self.stats_with_candidates(self.candidate_pairs().len())
    }

    /// Like [`stats`](Self::stats), reusing an already computed candidate
    /// count instead of enumerating the pairs again.
    pub fn stats_with_candidates(&self, candidate_pairs: usize) -> IndexStats {
        let total_buckets: usize = self.band_tables.iter().map(|t| t.len()).sum();
        let max_bucket_size = self
            .band_tables
            .iter()
            .flat_map(|t| t.values())
            .map(|v| v.len())
            .max()
            .unwrap_or(0);

        let n = self.entries.len();
        let naive_pairs = n.saturating_sub(1) * n / 2;
        let reduction_factor = if candidate_pairs > 0 {
            naive_pairs as f64 / candidate_pairs as f64
        } else {
            naive_pairs as f64
        };

        IndexStats {
            total_images: n,
            bands: self.bands,
            rows: self.rows,
            total_buckets,
            max_bucket_size,
            candidate_pairs,
            naive_pairs,
            reduction_factor,
        }
    }

    /// Consume the index and return the (path, signature) entries.
    pub fn into_entries(self) -> Vec<(PathBuf, Signature)> {
        self.entries
    }
}

/// Pack a band's bits MSB-first into bytes, preserving exact content.
fn pack_band(bits: &[bool]) -> BandKey {
    let mut key = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            key[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    key
}

/// Statistics about a built index
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Number of images indexed
    pub total_images: usize,
    /// Number of bands
    pub bands: usize,
    /// Bits per band
    pub rows: usize,
    /// Total number of buckets across all bands
    pub total_buckets: usize,
    /// Maximum bucket size
    pub max_bucket_size: usize,
    /// Number of candidate pairs
    pub candidate_pairs: usize,
    /// Number of comparisons a naive all-pairs scan would make
    pub naive_pairs: usize,
    /// Comparison reduction factor (naive / candidates)
    pub reduction_factor: f64,
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} images, {} bands ({} bits each), {} candidate pairs ({:.0}x reduction from {})",
            self.total_images,
            self.bands,
            self.rows,
            self.candidate_pairs,
            self.reduction_factor,
            self.naive_pairs
        )
    }
}
