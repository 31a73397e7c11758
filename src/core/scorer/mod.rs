//! # Scorer Module
//!
//! Scores candidate pairs by full-signature Hamming similarity and ranks
//! the accepted results.
//!
//! Scoring always uses the complete packed signatures, never the banded
//! slices, so the bucket index only ever decides WHICH pairs get scored,
//! not HOW they score. A pair is retained when its similarity strictly
//! exceeds the threshold.

use crate::core::index::CandidatePair;
use crate::core::signature::Signature;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// A candidate pair accepted by the threshold filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearDuplicate {
    /// The lexicographically smaller path of the pair
    pub first: PathBuf,
    /// The lexicographically larger path of the pair
    pub second: PathBuf,
    /// Fraction of signature bits that agree, in [0, 1]
    pub similarity: f64,
}

/// Score every candidate pair and keep those with `similarity > threshold`.
///
/// Pure per-pair work over the read-only signature map, parallel across
/// pairs. The comparison is strictly greater-than: a pair sitting exactly
/// at the threshold is rejected.
pub fn score_candidates(
    signatures: &HashMap<PathBuf, Signature>,
    candidates: &HashSet<CandidatePair>,
    threshold: f64,
) -> Vec<NearDuplicate> {
    candidates
        .par_iter()
        .filter_map(|pair| {
            let a = signatures.get(pair.first())?;
            let b = signatures.get(pair.second())?;
            let similarity = a.similarity(b);
            (similarity > threshold).then(|| NearDuplicate {
                first: pair.first().to_path_buf(),
                second: pair.second().to_path_buf(),
                similarity,
            })
        })
        .collect()
}

/// Order results by descending similarity.
///
/// Ties break on the canonical pair identifier so the output order is
/// reproducible regardless of the candidate set's iteration order.
pub fn rank(results: &mut [NearDuplicate]) {
    results.sort_by(|a, b| {
        b.similarity.total_cmp(&a.similarity).then_with(|| {
            (a.first.as_path(), a.second.as_path()).cmp(&(b.first.as_path(), b.second.as_path()))
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_of(bits: &[u8]) -> Signature {
        Signature::from_bits(bits.iter().map(|&b| b == 1).collect())
    }

    fn fixtures() -> HashMap<PathBuf, Signature> {
        let mut signatures = HashMap::new();
        // 8-bit signatures; /a and /b agree in 7 of 8 positions.
        signatures.insert(
            PathBuf::from("/a.jpg"),
            signature_of(&[1, 1, 1, 1, 0, 0, 0, 0]),
        );
        signatures.insert(
            PathBuf::from("/b.jpg"),
            signature_of(&[1, 1, 1, 1, 0, 0, 0, 1]),
        );
        signatures.insert(
            PathBuf::from("/c.jpg"),
            signature_of(&[0, 0, 0, 0, 1, 1, 1, 1]),
        );
        signatures
    }

    fn all_pairs(signatures: &HashMap<PathBuf, Signature>) -> HashSet<CandidatePair> {
        let paths: Vec<_> = signatures.keys().cloned().collect();
        let mut pairs = HashSet::new();
        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                pairs.insert(CandidatePair::new(paths[i].clone(), paths[j].clone()));
            }
        }
        pairs
    }

    #[test]
    fn keeps_only_pairs_above_threshold() {
        let signatures = fixtures();
        let results = score_candidates(&signatures, &all_pairs(&signatures), 0.8);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].first, PathBuf::from("/a.jpg"));
        assert_eq!(results[0].second, PathBuf::from("/b.jpg"));
        assert!((results[0].similarity - 0.875).abs() < 1e-9);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        let signatures = fixtures();
        // /a vs /b similarity is exactly 0.875; a threshold of 0.875 must
        // reject the pair.
        let results = score_candidates(&signatures, &all_pairs(&signatures), 0.875);
        assert!(results.is_empty());
    }

    #[test]
    fn identical_signatures_score_one() {
        let mut signatures = HashMap::new();
        signatures.insert(PathBuf::from("/x.png"), signature_of(&[1, 0, 1, 0]));
        signatures.insert(PathBuf::from("/y.png"), signature_of(&[1, 0, 1, 0]));

        let results = score_candidates(&signatures, &all_pairs(&signatures), 0.9);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].similarity, 1.0);
    }

    #[test]
    fn scoring_is_independent_of_pair_orientation() {
        let signatures = fixtures();
        let a = signatures[&PathBuf::from("/a.jpg")].clone();
        let b = signatures[&PathBuf::from("/b.jpg")].clone();
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn unknown_paths_are_skipped() {
        let signatures = fixtures();
        let mut candidates = HashSet::new();
        candidates.insert(CandidatePair::new(
            PathBuf::from("/a.jpg"),
            PathBuf::from("/missing.jpg"),
        ));

        let results = score_candidates(&signatures, &candidates, 0.0);
        assert!(results.is_empty());
    }

    #[test]
    fn rank_orders_by_descending_similarity() {
        let mut results = vec![
            NearDuplicate {
                first: PathBuf::from("/a.jpg"),
                second: PathBuf::from("/b.jpg"),
                similarity: 0.91,
            },
            NearDuplicate {
                first: PathBuf::from("/c.jpg"),
                second: PathBuf::from("/d.jpg"),
                similarity: 0.99,
            },
        ];

        rank(&mut results);

        assert_eq!(results[0].similarity, 0.99);
        assert_eq!(results[1].similarity, 0.91);
    }

    #[test]
    fn rank_breaks_ties_on_canonical_pair_order() {
        let mut results = vec![
            NearDuplicate {
                first: PathBuf::from("/m.jpg"),
                second: PathBuf::from("/n.jpg"),
                similarity: 0.95,
            },
            NearDuplicate {
                first: PathBuf::from("/a.jpg"),
                second: PathBuf::from("/b.jpg"),
                similarity: 0.95,
            },
        ];

        rank(&mut results);

        assert_eq!(results[0].first, PathBuf::from("/a.jpg"));
        assert_eq!(results[1].first, PathBuf::from("/m.jpg"));
    }
}
