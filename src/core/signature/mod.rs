//! # Signature Module
//!
//! Turns one image file into a fixed-length boolean signature.
//!
//! ## How It Works
//! 1. Decode the file and resize to (hash_size+1) x hash_size grayscale
//! 2. Compare each pixel to its horizontal neighbor (difference hash)
//! 3. Keep the bits both unpacked (for banding) and packed (for distance)
//!
//! The decode/resize step is an injected capability ([`GrayscaleDecoder`])
//! so the signature algorithm is testable against synthetic pixel buffers
//! without real image files.
//!
//! ## Example
//! ```rust,ignore
//! use near_dupes::core::signature::SignatureExtractor;
//!
//! let extractor = SignatureExtractor::new(16);
//! let signature = extractor.extract(&path)?;
//! ```

mod decode;
mod dhash;

pub use decode::{FileDecoder, GrayscaleDecoder};
pub use dhash::difference_signature;

use crate::error::SignatureError;
use std::path::Path;

/// Default hash size; signatures are `hash_size^2` bits long.
pub const DEFAULT_HASH_SIZE: u32 = 16;

/// A fixed-length perceptual fingerprint of one image.
///
/// Holds the ordered boolean vector (sliced into bands by the bucket index)
/// and a packed bit-per-value byte form (XOR'd for Hamming distance).
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    bits: Vec<bool>,
    packed: Vec<u8>,
}

impl Signature {
    /// Build a signature from its boolean vector, packing bits MSB-first.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        let mut packed = vec![0u8; bits.len().div_ceil(8)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                packed[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        Self { bits, packed }
    }

    /// The ordered boolean vector, row-major.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// The packed byte form. Trailing pad bits in the last byte are zero.
    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    /// Number of bits in the signature (`hash_size^2`).
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True for a zero-length signature.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Hamming distance: count of differing bits between two full signatures.
    pub fn distance(&self, other: &Self) -> u32 {
        self.packed
            .iter()
            .zip(other.packed.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Similarity ratio in [0, 1]: fraction of bits that agree.
    ///
    /// Symmetric in its two inputs; 1.0 exactly when the signatures are
    /// bit-identical.
    pub fn similarity(&self, other: &Self) -> f64 {
        let total = self.len();
        if total == 0 {
            return 1.0;
        }
        (total as f64 - f64::from(self.distance(other))) / total as f64
    }
}

/// Computes signatures for image files using an injected decoder.
pub struct SignatureExtractor {
    hash_size: u32,
    decoder: Box<dyn GrayscaleDecoder>,
}

impl SignatureExtractor {
    /// Create an extractor backed by the production file decoder.
    pub fn new(hash_size: u32) -> Self {
        Self::with_decoder(hash_size, Box::new(FileDecoder::new()))
    }

    /// Create an extractor with a custom decoder (e.g. for tests).
    pub fn with_decoder(hash_size: u32, decoder: Box<dyn GrayscaleDecoder>) -> Self {
        Self { hash_size, decoder }
    }

    /// The configured hash size.
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }

    /// Signature length in bits (`hash_size^2`).
    pub fn signature_len(&self) -> usize {
        (self.hash_size * self.hash_size) as usize
    }

    /// Extract the difference-hash signature of one file.
    ///
    /// Pure function of the file bytes; a file that cannot be decoded as an
    /// image yields a recoverable [`SignatureError`] and the caller skips it.
    pub fn extract(&self, path: &Path) -> Result<Signature, SignatureError> {
        let gray = self
            .decoder
            .decode_grayscale_resize(path, self.hash_size + 1, self.hash_size)?;
        Ok(difference_signature(&gray, self.hash_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_from_bytes(bytes: &[u8]) -> Signature {
        let bits = bytes
            .iter()
            .flat_map(|b| (0..8).map(move |i| (b >> (7 - i)) & 1 == 1))
            .collect();
        Signature::from_bits(bits)
    }

    #[test]
    fn packing_is_msb_first() {
        let signature = Signature::from_bits(vec![
            true, false, true, false, false, false, false, true,
        ]);
        assert_eq!(signature.packed(), &[0b1010_0001]);
    }

    #[test]
    fn packing_pads_trailing_bits_with_zero() {
        let signature = Signature::from_bits(vec![true, true, true]);
        assert_eq!(signature.len(), 3);
        assert_eq!(signature.packed(), &[0b1110_0000]);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let signature = signature_from_bytes(&[0xFF, 0x00, 0xAA, 0x55]);
        assert_eq!(signature.distance(&signature), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = signature_from_bytes(&[0xFF, 0x00]);
        let b = signature_from_bytes(&[0x0F, 0xF0]);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = signature_from_bytes(&[0b1111_1111]);
        let b = signature_from_bytes(&[0b0000_0000]);
        assert_eq!(a.distance(&b), 8);
    }

    #[test]
    fn similarity_is_one_iff_identical() {
        let a = signature_from_bytes(&[0xDE, 0xAD]);
        let b = signature_from_bytes(&[0xDE, 0xAD]);
        let c = signature_from_bytes(&[0xDE, 0xAC]);

        assert_eq!(a.similarity(&b), 1.0);
        assert!(a.similarity(&c) < 1.0);
    }

    #[test]
    fn similarity_is_zero_for_opposite() {
        let a = signature_from_bytes(&[0xFF]);
        let b = signature_from_bytes(&[0x00]);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = signature_from_bytes(&[0xF0, 0x0F]);
        let b = signature_from_bytes(&[0xFF, 0x00]);
        assert_eq!(a.similarity(&b), b.similarity(&a));
    }

    #[test]
    fn similarity_counts_padded_length_correctly() {
        // 12-bit signatures: distance lives in [0, 12] even though the
        // packed form spans two bytes.
        let a = Signature::from_bits(vec![true; 12]);
        let b = Signature::from_bits(vec![false; 12]);
        assert_eq!(a.distance(&b), 12);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn extractor_reports_signature_len() {
        let extractor = SignatureExtractor::new(16);
        assert_eq!(extractor.signature_len(), 256);
        assert_eq!(extractor.hash_size(), 16);
    }
}
