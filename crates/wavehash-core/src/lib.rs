//! Wavelet-based perceptual image hashing.
//!
//! This library provides:
//! - A 2-D discrete wavelet transform and subband feature extraction
//! - Bit quantization policies and a hex codec for fixed-length hashes
//! - Hamming distance metrics and threshold / ROC evaluation
//! - Hash galleries with top-k nearest neighbour retrieval
//!
//! ```no_run
//! use std::path::Path;
//! use wavehash_core::{Gallery, GalleryOptions, HashConfig, ImageSource};
//!
//! let config = HashConfig::db2_l2_median();
//! let gallery = Gallery::build(Path::new("photos"), config, &GalleryOptions::default())?;
//! let hits = gallery.retrieve(ImageSource::Path(Path::new("query.jpg")), 5, None)?;
//! for hit in hits {
//!     println!("{} {} {:.3}", hit.id, hit.distance, hit.similarity);
//! }
//! # Ok::<(), wavehash_core::Error>(())
//! ```

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::{
    HashConfig, HashConfigOverrides, ImageSize, QuantMethod, QuantParams, SubbandMode,
};
pub use error::{Error, Result};
pub use gallery::{Gallery, GalleryEntry, GalleryOptions, RetrievalMatch, SkippedImage};
pub use hashing::{bits_to_hex, compute_bits, compute_hash, hex_to_bits, wavelet_hash};
pub use metrics::{
    classify, compute_roc, evaluate_pairs, find_optimal_threshold, format_metrics_table,
    hamming_distance, normalized_distance, similarity, Criterion, EvaluationRecord, LabeledPair,
    RocCurve, ThresholdSearch,
};
pub use preprocessing::ImageSource;
pub use types::*;
pub use wavelet::Wavelet;

// -- Public Modules --
pub mod config;
pub mod discovery;
pub mod gallery;
pub mod hashing;
pub mod logging;
pub mod metrics;
pub mod preprocessing;
pub mod types;
pub mod wavelet;

// -- Test Modules --
#[cfg(test)]
pub mod test_utils;
