use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::ImageFormat;

/// Find supported images under `directory`.
///
/// Non-recursive scans only look at the directory itself. `max_depth` caps
/// recursive scans (1 = the directory itself). Paths come back in walk
/// order with entries of each directory sorted by file name, so repeated
/// scans of the same tree yield the same sequence.
pub fn discover_images(
    directory: &Path,
    recursive: bool,
    max_depth: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(Error::FileNotFound(directory.to_path_buf()));
    }

    let max_depth = if recursive {
        max_depth.unwrap_or(usize::MAX)
    } else {
        1
    };

    let mut images = Vec::new();
    for entry in WalkDir::new(directory)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable entries are skipped, the scan carries on
                log_file_error(e.path().unwrap_or(directory), "scan", &e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_image_path(entry.path()) {
            images.push(entry.into_path());
        }
    }

    Ok(images)
}

/// Returns if the given path has a supported image extension
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ImageFormat::from_extension(ext).is_supported())
        .unwrap_or(false)
}
