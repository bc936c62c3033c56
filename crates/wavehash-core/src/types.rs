use serde::{Deserialize, Serialize};

use crate::config::HashConfig;
use crate::error::{Error, Result};
use crate::hashing::codec::bits_to_hex;
use crate::metrics::distance::hamming_distance;

/// Supported image formats
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    WebP,
    Other(String),
}

impl ImageFormat {
    /// Determine format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "bmp" => Self::Bmp,
            "tiff" => Self::Tiff,
            "webp" => Self::WebP,
            other => Self::Other(other.to_string()),
        }
    }

    /// Check if format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// Output of one wavelet hash computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashResult {
    /// Hash bits (0/1), always `config.hash_bits` long
    pub bits: Vec<u8>,

    /// Lowercase hex encoding of `bits`
    pub hex: String,

    /// Resolved configuration the hash was made with
    pub config: HashConfig,

    /// (rows, cols) of the coarsest approximation subband
    pub subband_shape: (usize, usize),

    /// Feature vector length before quantization
    pub feature_len: usize,
}

impl HashResult {
    /// Wrap precomputed bits
    pub fn from_bits(bits: Vec<u8>, config: HashConfig) -> Result<Self> {
        if bits.len() != config.hash_bits {
            return Err(Error::LengthMismatch {
                left: bits.len(),
                right: config.hash_bits,
            });
        }
        if bits.iter().any(|&b| b > 1) {
            return Err(Error::InvalidConfiguration(
                "hash bits must be 0 or 1".to_string(),
            ));
        }

        let hex = bits_to_hex(&bits);
        Ok(Self {
            bits,
            hex,
            config,
            subband_shape: (0, 0),
            feature_len: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Hamming distance to another hash
    pub fn distance(&self, other: &HashResult) -> Result<u32> {
        hamming_distance(&self.bits, &other.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("webp"), ImageFormat::WebP);
        assert!(ImageFormat::from_extension("Tiff").is_supported());
        assert!(!ImageFormat::from_extension("tif").is_supported());
        assert!(!ImageFormat::from_extension("heic").is_supported());
    }

    #[test]
    fn test_from_bits() {
        let mut config = HashConfig::default();
        config.hash_bits = 8;

        let hash = HashResult::from_bits(vec![1, 0, 1, 1, 0, 0, 0, 0], config.clone()).unwrap();
        assert_eq!(hash.hex, "b0");
        assert_eq!(hash.len(), 8);

        assert!(matches!(
            HashResult::from_bits(vec![1, 0], config.clone()),
            Err(Error::LengthMismatch { left: 2, right: 8 })
        ));
        assert!(HashResult::from_bits(vec![2; 8], config).is_err());
    }

    #[test]
    fn test_distance() {
        let mut config = HashConfig::default();
        config.hash_bits = 4;
        let a = HashResult::from_bits(vec![1, 0, 1, 0], config.clone()).unwrap();
        let b = HashResult::from_bits(vec![0, 0, 1, 1], config).unwrap();
        assert_eq!(a.distance(&b).unwrap(), 2);
        assert_eq!(b.distance(&a).unwrap(), 2);
        assert_eq!(a.distance(&a).unwrap(), 0);
    }
}
