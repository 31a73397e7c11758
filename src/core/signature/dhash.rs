//! Difference-hash bit extraction.
//!
//! Works on an already decoded (hash_size+1) x hash_size grayscale buffer:
//! for each row, compare each pixel's intensity to its right neighbor and
//! emit 1 when the left pixel is darker, 0 otherwise, in row-major order.
//! The extra column exists only to give the last pixel of each row a
//! neighbor, so the result is exactly hash_size^2 bits.

use super::Signature;
use image::GrayImage;

/// Compute the difference-hash signature of a grayscale buffer.
///
/// The buffer must be (hash_size+1) pixels wide and hash_size pixels tall;
/// the decoder contract guarantees this.
pub fn difference_signature(gray: &GrayImage, hash_size: u32) -> Signature {
    debug_assert_eq!(gray.width(), hash_size + 1);
    debug_assert_eq!(gray.height(), hash_size);

    let mut bits = Vec::with_capacity((hash_size * hash_size) as usize);
    for y in 0..hash_size {
        for x in 0..hash_size {
            let left = gray.get_pixel(x, y)[0];
            let right = gray.get_pixel(x + 1, y)[0];
            bits.push(left < right);
        }
    }
    Signature::from_bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gray_from_fn(hash_size: u32, f: impl Fn(u32, u32) -> u8) -> GrayImage {
        GrayImage::from_fn(hash_size + 1, hash_size, |x, y| Luma([f(x, y)]))
    }

    #[test]
    fn signature_has_hash_size_squared_bits() {
        let gray = gray_from_fn(8, |_, _| 128);
        let signature = difference_signature(&gray, 8);
        assert_eq!(signature.len(), 64);
    }

    #[test]
    fn rising_gradient_sets_every_bit() {
        // Brightness increases left to right, so every left pixel is darker.
        let gray = gray_from_fn(8, |x, _| (x * 28) as u8);
        let signature = difference_signature(&gray, 8);
        assert!(signature.bits().iter().all(|&b| b));
    }

    #[test]
    fn falling_gradient_clears_every_bit() {
        let gray = gray_from_fn(8, |x, _| 255 - (x * 28) as u8);
        let signature = difference_signature(&gray, 8);
        assert!(signature.bits().iter().all(|&b| !b));
    }

    #[test]
    fn flat_image_clears_every_bit() {
        // Equal neighbors are not "darker", so the bit is 0.
        let gray = gray_from_fn(8, |_, _| 200);
        let signature = difference_signature(&gray, 8);
        assert!(signature.bits().iter().all(|&b| !b));
    }

    #[test]
    fn bits_are_row_major() {
        // Only row 1 rises; its 8 bits occupy positions 8..16.
        let gray = gray_from_fn(8, |x, y| if y == 1 { (x * 28) as u8 } else { 0 });
        let signature = difference_signature(&gray, 8);

        for (i, &bit) in signature.bits().iter().enumerate() {
            assert_eq!(bit, (8..16).contains(&i), "bit {} wrong", i);
        }
    }

    #[test]
    fn identical_buffers_produce_identical_signatures() {
        let a = gray_from_fn(16, |x, y| ((x * 7 + y * 13) % 251) as u8);
        let b = gray_from_fn(16, |x, y| ((x * 7 + y * 13) % 251) as u8);

        let sig_a = difference_signature(&a, 16);
        let sig_b = difference_signature(&b, 16);
        assert_eq!(sig_a.distance(&sig_b), 0);
        assert_eq!(sig_a.similarity(&sig_b), 1.0);
    }
}
