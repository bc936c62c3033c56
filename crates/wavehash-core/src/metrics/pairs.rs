use log::debug;
use rayon::prelude::*;

use crate::config::HashConfig;
use crate::error::Result;
use crate::hashing::wavelet_hash;
use crate::metrics::distance::hamming_distance;
use crate::preprocessing::ImageSource;

/// Two images with a ground-truth "similar" label
#[derive(Debug, Clone, Copy)]
pub struct LabeledPair<'a> {
    pub left: ImageSource<'a>,
    pub right: ImageSource<'a>,
    pub similar: bool,
}

impl<'a> LabeledPair<'a> {
    pub fn new(
        left: impl Into<ImageSource<'a>>,
        right: impl Into<ImageSource<'a>>,
        similar: bool,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            similar,
        }
    }
}

/// Hamming distances of a set of pairs, aligned with their labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairDistances {
    pub distances: Vec<f64>,
    pub labels: Vec<bool>,
}

impl PairDistances {
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Hash both sides of every pair and collect their distances.
///
/// Pairs are hashed in parallel; output order follows `pairs`. Any hashing
/// failure aborts the evaluation.
pub fn evaluate_pairs(pairs: &[LabeledPair<'_>], config: &HashConfig) -> Result<PairDistances> {
    config.validate()?;

    let distances = pairs
        .par_iter()
        .map(|pair| {
            let left = wavelet_hash(pair.left, config)?;
            let right = wavelet_hash(pair.right, config)?;
            let distance = hamming_distance(&left.bits, &right.bits)?;
            debug!(
                "Pair {} / {}: distance {} (similar: {})",
                pair.left.describe(),
                pair.right.describe(),
                distance,
                pair.similar
            );
            Ok(distance as f64)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(PairDistances {
        distances,
        labels: pairs.iter().map(|pair| pair.similar).collect(),
    })
}
