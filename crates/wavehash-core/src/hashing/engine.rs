use log::debug;
use ndarray::Array2;

use crate::config::{HashConfig, HashConfigOverrides};
use crate::error::Result;
use crate::hashing::codec::bits_to_hex;
use crate::hashing::features::extract_features;
use crate::hashing::quantize::quantize_to_bits;
use crate::preprocessing::{load_image_array, ImageSource};
use crate::types::HashResult;
use crate::wavelet::wavedec2;

/// Hash an already normalized grayscale grid with a resolved config.
///
/// Runs decomposition, feature extraction, quantization and hex encoding.
pub fn hash_pixels(grid: &Array2<f64>, config: &HashConfig) -> Result<HashResult> {
    let wavelet = config.wavelet()?;
    let tree = wavedec2(grid, wavelet, config.level)?;
    let features = extract_features(&tree, config.subband_mode)?;
    let bits = quantize_to_bits(
        &features,
        config.quant_method,
        config.hash_bits,
        &config.quant_params,
    )?;
    let hex = bits_to_hex(&bits);

    Ok(HashResult {
        bits,
        hex,
        config: config.clone(),
        subband_shape: tree.approximation_shape(),
        feature_len: features.len(),
    })
}

/// Compute the wavelet hash of one image.
///
/// `overrides` is merged onto `config` first. Nothing is cached, every call
/// decodes and decomposes the image again.
pub fn compute_hash(
    source: ImageSource<'_>,
    config: &HashConfig,
    overrides: &HashConfigOverrides,
) -> Result<HashResult> {
    let resolved = config.with_overrides(overrides);
    resolved.validate()?;

    let grid = load_image_array(source, resolved.image_size)?;
    let result = hash_pixels(&grid, &resolved)?;

    debug!(
        "Hashed {} with {} -> {} (subband {:?}, {} features)",
        source.describe(),
        resolved,
        result.hex,
        result.subband_shape,
        result.feature_len
    );

    Ok(result)
}

/// [`compute_hash`] without overrides
pub fn wavelet_hash(source: ImageSource<'_>, config: &HashConfig) -> Result<HashResult> {
    compute_hash(source, config, &HashConfigOverrides::default())
}

/// Only the hash bits of an image
pub fn compute_bits(source: ImageSource<'_>, config: &HashConfig) -> Result<Vec<u8>> {
    wavelet_hash(source, config).map(|result| result.bits)
}
