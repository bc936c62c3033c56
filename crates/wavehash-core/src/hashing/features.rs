use crate::config::SubbandMode;
use crate::error::{Error, Result};
use crate::wavelet::CoefficientTree;

/// Flatten the subbands selected by `mode` into one feature vector.
///
/// Only the coarsest level is used. Bands are concatenated in row-major
/// order, approximation first, then horizontal, vertical and diagonal
/// detail as selected.
pub fn extract_features(tree: &CoefficientTree, mode: SubbandMode) -> Result<Vec<f64>> {
    let details = tree.coarsest_details().ok_or_else(|| {
        Error::InvalidConfiguration(
            "coefficient tree has no decomposition levels".to_string(),
        )
    })?;

    let bands = match mode {
        SubbandMode::Ll => vec![&tree.approximation],
        SubbandMode::LlLh => vec![&tree.approximation, &details.horizontal],
        SubbandMode::LlHl => vec![&tree.approximation, &details.vertical],
        SubbandMode::LlLhHl => vec![&tree.approximation, &details.horizontal, &details.vertical],
        SubbandMode::All => vec![
            &tree.approximation,
            &details.horizontal,
            &details.vertical,
            &details.diagonal,
        ],
    };

    let len = bands.iter().map(|band| band.len()).sum();
    let mut features = Vec::with_capacity(len);
    for band in bands {
        features.extend(band.iter().copied());
    }

    Ok(features)
}
