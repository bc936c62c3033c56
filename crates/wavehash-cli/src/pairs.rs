use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use wavehash_core::discovery::discover_images;

/// A pair of image files with its ground-truth label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairFiles {
    pub left: PathBuf,
    pub right: PathBuf,
    pub similar: bool,
}

/// Collect labelled pairs from a dataset laid out as
///
/// ```text
/// ROOT/similar/<pair>/{two images}
/// ROOT/dissimilar/<pair>/{two images}
/// ```
///
/// Pair directories that do not hold exactly two images are skipped with a
/// warning. Similar pairs come first, each group sorted by directory name.
pub fn collect_pairs(root: &Path) -> Result<Vec<PairFiles>> {
    let mut pairs = Vec::new();
    for (group, similar) in [("similar", true), ("dissimilar", false)] {
        let group_dir = root.join(group);
        if !group_dir.is_dir() {
            warn!("No '{}' directory under {}", group, root.display());
            continue;
        }

        let mut pair_dirs: Vec<PathBuf> = fs::read_dir(&group_dir)
            .with_context(|| format!("Failed to read {}", group_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        pair_dirs.sort();

        for pair_dir in pair_dirs {
            let images = discover_images(&pair_dir, false, None)?;
            match <[PathBuf; 2]>::try_from(images) {
                Ok([left, right]) => pairs.push(PairFiles {
                    left,
                    right,
                    similar,
                }),
                Err(images) => warn!(
                    "Skipping {}: expected 2 images, found {}",
                    pair_dir.display(),
                    images.len()
                ),
            }
        }
    }
    Ok(pairs)
}
