//! Hamming distance between equal-length bit arrays.
//!
//! Rough reading for 256-bit wavelet hashes:
//!
//! - under ~10% of the bits: same image with minor edits
//! - 10-25%: related content
//! - beyond that: different images

use crate::error::{Error, Result};

/// Number of positions where the bits differ
pub fn hamming_distance(a: &[u8], b: &[u8]) -> Result<u32> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).filter(|(x, y)| x != y).count() as u32)
}

/// Hamming distance divided by the bit length, in [0, 1].
/// Two empty arrays are identical (0.0).
pub fn normalized_distance(a: &[u8], b: &[u8]) -> Result<f64> {
    let distance = hamming_distance(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }
    Ok(distance as f64 / a.len() as f64)
}

/// 1 - normalized distance; 1.0 for identical bit strings
pub fn similarity(a: &[u8], b: &[u8]) -> Result<f64> {
    Ok(1.0 - normalized_distance(a, b)?)
}
