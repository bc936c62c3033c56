//! # Bit Quantization
//!
//! Turns a float feature vector into a fixed-length bit array.
//!
//! ## Methods
//!
//! - `median`: bit = value > median
//! - `mean`: bit = value > mean
//! - `ternary`: values below `median - k·MAD` give 0, values above
//!   `median + k·MAD` give 1, values inside the band (inclusive) give
//!   `mid_policy`. Parameters `k` (default 1.0) and `mid_policy` (0 or 1,
//!   default 0).
//! - `uniform_step`: round `value / delta` to the nearest integer (ties to
//!   even) and keep its least significant bit. Parameter `delta`
//!   (default 5.0).
//!
//! ## Length normalization
//!
//! When there are at least `target_bits` raw bits, `target_bits` indices are
//! sampled evenly over `[0, n - 1]` (endpoints included, rounded to the
//! nearest index). Shorter bit strings are right-padded with zeros.

use crate::config::{QuantMethod, QuantParams};
use crate::error::{Error, Result};

/// Guard added to the MAD so an all-equal vector still has a band
pub const MAD_EPSILON: f64 = 1e-12;

pub const DEFAULT_TERNARY_K: f64 = 1.0;
pub const DEFAULT_MID_POLICY: u8 = 0;
pub const DEFAULT_UNIFORM_DELTA: f64 = 5.0;

/// Median (mean of the two middle values for even lengths). 0.0 when empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Arithmetic mean. 0.0 when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn param(params: &QuantParams, key: &str, default: f64) -> f64 {
    params.get(key).copied().unwrap_or(default)
}

fn threshold_bits(features: &[f64], threshold: f64) -> Vec<u8> {
    features.iter().map(|&v| u8::from(v > threshold)).collect()
}

fn ternary_bits(features: &[f64], params: &QuantParams) -> Result<Vec<u8>> {
    let k = param(params, "k", DEFAULT_TERNARY_K);
    let mid_policy = match param(params, "mid_policy", DEFAULT_MID_POLICY as f64) {
        p if p == 0.0 => 0u8,
        p if p == 1.0 => 1u8,
        p => {
            return Err(Error::InvalidConfiguration(format!(
                "Ternary mid_policy must be 0 or 1, got {}",
                p
            )))
        }
    };

    let med = median(features);
    let deviations: Vec<f64> = features.iter().map(|v| (v - med).abs()).collect();
    let mad = median(&deviations) + MAD_EPSILON;
    let low = med - k * mad;
    let high = med + k * mad;

    Ok(features
        .iter()
        .map(|&v| {
            if v < low {
                0
            } else if v > high {
                1
            } else {
                mid_policy
            }
        })
        .collect())
}

fn uniform_step_bits(features: &[f64], params: &QuantParams) -> Result<Vec<u8>> {
    let delta = param(params, "delta", DEFAULT_UNIFORM_DELTA);
    if !delta.is_finite() || delta <= 0.0 {
        return Err(Error::InvalidConfiguration(format!(
            "Uniform step delta must be positive, got {}",
            delta
        )));
    }

    Ok(features
        .iter()
        .map(|&v| {
            let step = (v / delta).round_ties_even() as i64;
            (step & 1) as u8
        })
        .collect())
}

/// Sample or pad raw bits to exactly `target_bits`
pub fn normalize_length(bits: &[u8], target_bits: usize) -> Vec<u8> {
    if target_bits == 0 {
        return Vec::new();
    }

    let n = bits.len();
    if n >= target_bits {
        if target_bits == 1 {
            return vec![bits[0]];
        }
        let span = (n - 1) as f64;
        let steps = (target_bits - 1) as f64;
        (0..target_bits)
            .map(|i| {
                let index = ((i as f64 * span) / steps).round() as usize;
                bits[index.min(n - 1)]
            })
            .collect()
    } else {
        let mut out = bits.to_vec();
        out.resize(target_bits, 0);
        out
    }
}

/// Quantize a feature vector into exactly `target_bits` bits
pub fn quantize_to_bits(
    features: &[f64],
    method: QuantMethod,
    target_bits: usize,
    params: &QuantParams,
) -> Result<Vec<u8>> {
    let raw = match method {
        QuantMethod::Median => threshold_bits(features, median(features)),
        QuantMethod::Mean => threshold_bits(features, mean(features)),
        QuantMethod::Ternary => ternary_bits(features, params)?,
        QuantMethod::UniformStep => uniform_step_bits(features, params)?,
    };

    Ok(normalize_length(&raw, target_bits))
}
