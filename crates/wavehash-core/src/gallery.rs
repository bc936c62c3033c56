//! Gallery of precomputed wavelet hashes and top-k retrieval.
//!
//! A gallery is built once from a directory (or in-memory images) with one
//! [`HashConfig`], then queried any number of times. Queries must be hashed
//! with a compatible configuration, otherwise distances are meaningless.
//!
//! Retrieval is a linear scan: every entry is compared with the query and
//! the closest `top_k` are returned in ascending distance order. Entries at
//! equal distance keep gallery order.

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Instant;

use crate::config::HashConfig;
use crate::discovery::discover_images;
use crate::error::{Error, Result};
use crate::hashing::wavelet_hash;
use crate::logging::log_hash_error;
use crate::metrics::hamming_distance;
use crate::preprocessing::ImageSource;
use crate::types::HashResult;

/// How a gallery is built from a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryOptions {
    /// Descend into subdirectories
    pub recursive: bool,

    /// Maximum walk depth for recursive scans (1 = top directory only)
    pub max_depth: Option<usize>,

    /// Worker threads for hashing, 0 = one per CPU
    pub threads: usize,

    /// Show a progress bar on stderr
    pub show_progress: bool,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: None,
            threads: 0,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    pub id: String,
    pub hash: HashResult,
}

/// An image left out of the gallery and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub id: String,
    pub reason: String,
}

/// One retrieval hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub id: String,
    pub distance: u32,
    /// 1 - distance / hash_bits
    pub similarity: f64,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    config: HashConfig,
    entries: Vec<GalleryEntry>,
    index: HashMap<String, usize>,
    skipped: Vec<SkippedImage>,
}

impl Gallery {
    /// Empty gallery for hashes made with `config`
    pub fn new(config: HashConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            index: HashMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Hash every supported image under `directory`.
    ///
    /// Images that fail to decode or hash are logged and recorded in
    /// [`Gallery::skipped`]; they never abort the build. Entries are keyed by
    /// canonical path and ordered like the directory scan.
    pub fn build(directory: &Path, config: HashConfig, options: &GalleryOptions) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let paths = discover_images(directory, options.recursive, options.max_depth)?;
        info!(
            "Building gallery from {} images in {} with {}",
            paths.len(),
            directory.display(),
            config
        );

        let threads = if options.threads == 0 {
            num_cpus::get()
        } else {
            options.threads
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;

        let progress = progress_bar(paths.len(), options.show_progress);

        // Hash in parallel, merge sequentially in scan order
        let results: Vec<(String, Result<HashResult>)> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let id = image_id(path);
                    let result = wavelet_hash(ImageSource::Path(path), &config);
                    progress.inc(1);
                    (id, result)
                })
                .collect()
        });
        progress.finish_and_clear();

        let mut gallery = Self::new(config);
        gallery.merge(results);

        info!(
            "Gallery built: {} entries, {} skipped in {:.2?}",
            gallery.len(),
            gallery.skipped.len(),
            start.elapsed()
        );
        Ok(gallery)
    }

    /// Hash caller-named in-memory images, with the same skip policy as
    /// [`Gallery::build`]
    pub fn from_images<'a, I>(images: I, config: HashConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (String, ImageSource<'a>)>,
    {
        config.validate()?;
        let images: Vec<(String, ImageSource<'a>)> = images.into_iter().collect();

        let results: Vec<(String, Result<HashResult>)> = images
            .par_iter()
            .map(|(id, source)| (id.clone(), wavelet_hash(*source, &config)))
            .collect();

        let mut gallery = Self::new(config);
        gallery.merge(results);
        Ok(gallery)
    }

    fn merge(&mut self, results: Vec<(String, Result<HashResult>)>) {
        for (id, result) in results {
            match result {
                Ok(hash) => {
                    self.put(id, hash);
                }
                Err(e) => {
                    log_hash_error(&id, &e);
                    self.skipped.push(SkippedImage {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn put(&mut self, id: String, hash: HashResult) -> Option<HashResult> {
        match self.index.get(&id) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].hash, hash)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push(GalleryEntry { id, hash });
                None
            }
        }
    }

    /// Add or replace an entry. A repeated id keeps its position and the
    /// previous hash is returned.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        hash: HashResult,
    ) -> Result<Option<HashResult>> {
        if !self.config.is_compatible_with(&hash.config) {
            return Err(Error::InvalidConfiguration(format!(
                "hash made with {} does not match gallery config {}",
                hash.config, self.config
            )));
        }
        Ok(self.put(id.into(), hash))
    }

    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    pub fn get(&self, id: &str) -> Option<&HashResult> {
        self.index.get(id).map(|&position| &self.entries[position].hash)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in gallery order
    pub fn iter(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.entries.iter()
    }

    /// Images that could not be hashed during construction
    pub fn skipped(&self) -> &[SkippedImage] {
        &self.skipped
    }

    /// Hash `query` with the gallery's configuration and rank the gallery
    pub fn retrieve(
        &self,
        query: ImageSource<'_>,
        top_k: usize,
        max_distance: Option<u32>,
    ) -> Result<Vec<RetrievalMatch>> {
        let hash = wavelet_hash(query, &self.config)?;
        self.retrieve_bits(&hash.bits, top_k, max_distance)
    }

    /// Like [`Gallery::retrieve`] with a caller-supplied configuration, which
    /// must be compatible with the gallery's
    pub fn retrieve_with_config(
        &self,
        query: ImageSource<'_>,
        config: &HashConfig,
        top_k: usize,
        max_distance: Option<u32>,
    ) -> Result<Vec<RetrievalMatch>> {
        if !self.config.is_compatible_with(config) {
            return Err(Error::InvalidConfiguration(format!(
                "query config {} does not match gallery config {}",
                config, self.config
            )));
        }
        let hash = wavelet_hash(query, config)?;
        self.retrieve_bits(&hash.bits, top_k, max_distance)
    }

    /// Rank the gallery against precomputed query bits
    pub fn retrieve_bits(
        &self,
        bits: &[u8],
        top_k: usize,
        max_distance: Option<u32>,
    ) -> Result<Vec<RetrievalMatch>> {
        if bits.len() != self.config.hash_bits {
            return Err(Error::LengthMismatch {
                left: bits.len(),
                right: self.config.hash_bits,
            });
        }

        let bit_count = bits.len().max(1) as f64;
        let mut matches = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let distance = hamming_distance(bits, &entry.hash.bits)?;
            if max_distance.is_some_and(|max| distance > max) {
                continue;
            }
            matches.push(RetrievalMatch {
                id: entry.id.clone(),
                distance,
                similarity: 1.0 - distance as f64 / bit_count,
            });
        }

        // Stable sort: equal distances keep gallery order
        matches.sort_by_key(|m| m.distance);
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Mean precision@k over labelled queries.
    ///
    /// A hit is relevant when its label in `labels` equals the query's label.
    /// Each query is retrieved once with the largest k. k = 0 scores 0.
    pub fn precision_at_k(
        &self,
        queries: &[(ImageSource<'_>, &str)],
        labels: &HashMap<String, String>,
        ks: &[usize],
    ) -> Result<BTreeMap<usize, f64>> {
        let mut sums: BTreeMap<usize, f64> = ks.iter().map(|&k| (k, 0.0)).collect();
        let max_k = ks.iter().copied().max().unwrap_or(0);

        for (query, query_label) in queries {
            let hits = self.retrieve(*query, max_k, None)?;
            // Keys are unique, so a repeated k is scored once
            for (&k, sum) in sums.iter_mut() {
                if k == 0 {
                    continue;
                }
                let relevant = hits
                    .iter()
                    .take(k)
                    .filter(|hit| labels.get(&hit.id).map(String::as_str) == Some(*query_label))
                    .count();
                *sum += relevant as f64 / k as f64;
            }
        }

        let count = queries.len();
        Ok(sums
            .into_iter()
            .map(|(k, sum)| (k, if count == 0 { 0.0 } else { sum / count as f64 }))
            .collect())
    }
}

/// Canonical path when it resolves, the path as given otherwise
fn image_id(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    // The template is a constant, fall back to the default style if it is rejected
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message("Hashing gallery images...");
    bar
}
