//! Threshold evaluation for distance-based similarity decisions.
//!
//! A pair is predicted "similar" when its distance is at or below the
//! threshold. Labels use `true` for similar pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of candidate thresholds tried by [`find_optimal_threshold`] by default
pub const DEFAULT_NUM_THRESHOLDS: usize = 100;

/// Added to every ratio denominator so degenerate inputs stay defined
const EPSILON: f64 = 1e-12;

/// Confusion matrix and derived metrics at one threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub threshold: f64,
    pub accuracy: f64,
    /// True positive rate (recall)
    pub sensitivity: f64,
    /// True negative rate
    pub specificity: f64,
    pub precision: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationRecord {
    /// Youden's J: sensitivity + specificity - 1
    pub fn youden(&self) -> f64 {
        self.sensitivity + self.specificity - 1.0
    }
}

fn check_lengths(distances: &[f64], labels: &[bool]) -> Result<()> {
    if distances.len() != labels.len() {
        return Err(Error::LengthMismatch {
            left: distances.len(),
            right: labels.len(),
        });
    }
    Ok(())
}

/// Classify every pair at `threshold` (inclusive) and score the result
pub fn classify(distances: &[f64], labels: &[bool], threshold: f64) -> Result<EvaluationRecord> {
    check_lengths(distances, labels)?;

    let (mut tp, mut tn, mut fp, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (&distance, &similar) in distances.iter().zip(labels) {
        let predicted = distance <= threshold;
        match (predicted, similar) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
        }
    }

    let total = distances.len() as f64;
    let accuracy = (tp + tn) as f64 / (total + EPSILON);
    let sensitivity = tp as f64 / ((tp + fn_) as f64 + EPSILON);
    let specificity = tn as f64 / ((tn + fp) as f64 + EPSILON);
    let precision = tp as f64 / ((tp + fp) as f64 + EPSILON);
    let f1 = 2.0 * precision * sensitivity / (precision + sensitivity + EPSILON);

    Ok(EvaluationRecord {
        threshold,
        accuracy,
        sensitivity,
        specificity,
        precision,
        f1,
        true_positives: tp,
        true_negatives: tn,
        false_positives: fp,
        false_negatives: fn_,
    })
}

/// What the threshold search maximizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Accuracy,
    /// Sensitivity + specificity - 1
    Youden,
    F1,
}

impl Criterion {
    pub fn score(&self, record: &EvaluationRecord) -> f64 {
        match self {
            Self::Accuracy => record.accuracy,
            Self::Youden => record.youden(),
            Self::F1 => record.f1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Youden => "youden",
            Self::F1 => "f1",
        }
    }
}

impl FromStr for Criterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(Self::Accuracy),
            "youden" => Ok(Self::Youden),
            "f1" => Ok(Self::F1),
            _ => Err(Error::InvalidConfiguration(format!(
                "unknown criterion '{}', expected one of: accuracy, youden, f1",
                s
            ))),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`find_optimal_threshold`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSearch {
    pub criterion: Criterion,
    /// Metrics at the winning threshold
    pub best: EvaluationRecord,
    pub best_score: f64,
    /// One record per candidate threshold, in ascending threshold order
    pub records: Vec<EvaluationRecord>,
}

/// Evenly spaced values over [min, max], endpoints included
fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 1 {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    let mut values: Vec<f64> = (0..count).map(|i| min + step * i as f64).collect();
    // Avoid accumulated error on the upper endpoint
    values[count - 1] = max;
    values
}

/// Scan `num_thresholds` thresholds between the smallest and largest
/// distance and keep the first one that maximizes `criterion`
pub fn find_optimal_threshold(
    distances: &[f64],
    labels: &[bool],
    criterion: Criterion,
    num_thresholds: usize,
) -> Result<ThresholdSearch> {
    check_lengths(distances, labels)?;
    if distances.is_empty() {
        return Err(Error::EmptyInput(
            "threshold search needs at least one distance".to_string(),
        ));
    }
    if num_thresholds == 0 {
        return Err(Error::InvalidConfiguration(
            "number of thresholds must be at least 1".to_string(),
        ));
    }

    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut records = Vec::with_capacity(num_thresholds);
    let mut best: Option<(EvaluationRecord, f64)> = None;

    for threshold in linspace(min, max, num_thresholds) {
        let record = classify(distances, labels, threshold)?;
        let score = criterion.score(&record);
        let improved = match &best {
            Some((_, best_score)) => score > *best_score,
            None => true,
        };
        if improved {
            best = Some((record, score));
        }
        records.push(record);
    }

    let (best, best_score) = best.ok_or_else(|| {
        Error::EmptyInput("threshold search produced no candidates".to_string())
    })?;

    Ok(ThresholdSearch {
        criterion,
        best,
        best_score,
        records,
    })
}

/// One operating point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    /// Pairs with distance <= this value are predicted similar.
    /// The first point uses negative infinity (nothing predicted similar).
    pub distance_threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    /// Points in ascending distance threshold order, starting at (0, 0)
    pub points: Vec<RocPoint>,
    /// Area under the curve (trapezoidal rule)
    pub auc: f64,
    /// Index into `points` maximizing TPR - FPR (first occurrence)
    pub optimal_index: usize,
    pub optimal_threshold: f64,
    pub optimal_tpr: f64,
    pub optimal_fpr: f64,
}

impl RocCurve {
    pub fn optimal_point(&self) -> &RocPoint {
        &self.points[self.optimal_index]
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// ROC curve over every distinct distance, treating lower distance as a
/// higher "similar" score
pub fn compute_roc(distances: &[f64], labels: &[bool]) -> Result<RocCurve> {
    check_lengths(distances, labels)?;
    if distances.is_empty() {
        return Err(Error::EmptyInput(
            "ROC curve needs at least one distance".to_string(),
        ));
    }

    let positives = labels.iter().filter(|&&similar| similar).count();
    let negatives = labels.len() - positives;

    let mut order: Vec<usize> = (0..distances.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    let mut points = vec![RocPoint {
        distance_threshold: f64::NEG_INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    }];

    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let threshold = distances[order[i]];
        // Consume every sample sharing this distance
        while i < order.len() && distances[order[i]].total_cmp(&threshold).is_eq() {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            distance_threshold: threshold,
            fpr: rate(fp, negatives),
            tpr: rate(tp, positives),
        });
    }

    let auc: f64 = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum();

    let mut optimal_index = 0;
    let mut best_j = f64::NEG_INFINITY;
    for (index, point) in points.iter().enumerate() {
        let j = point.tpr - point.fpr;
        if j > best_j {
            best_j = j;
            optimal_index = index;
        }
    }

    let optimal = points[optimal_index];
    Ok(RocCurve {
        auc,
        optimal_index,
        optimal_threshold: optimal.distance_threshold,
        optimal_tpr: optimal.tpr,
        optimal_fpr: optimal.fpr,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DISTANCES: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
    const LABELS: [bool; 5] = [true, true, false, false, false];

    #[test]
    fn test_classify_counts() {
        let record = classify(&DISTANCES, &LABELS, 2.0).unwrap();
        assert_eq!(record.true_positives, 2);
        assert_eq!(record.false_positives, 1);
        assert_eq!(record.true_negatives, 2);
        assert_eq!(record.false_negatives, 0);
        assert_abs_diff_eq!(record.accuracy, 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(record.sensitivity, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.specificity, 2.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.precision, 2.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.f1, 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let record = classify(&[3.0], &[true], 3.0).unwrap();
        assert_eq!(record.true_positives, 1);
    }

    #[test]
    fn test_single_class_stays_defined() {
        let record = classify(&[1.0, 2.0], &[true, true], 5.0).unwrap();
        assert_abs_diff_eq!(record.accuracy, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(record.specificity, 0.0, epsilon = 1e-9);
        assert!(record.f1.is_finite());

        let record = classify(&[], &[], 1.0).unwrap();
        assert_eq!(record.accuracy, 0.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            classify(&[1.0, 2.0], &[true], 1.0),
            Err(Error::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn test_optimal_threshold_separable() {
        let search =
            find_optimal_threshold(&DISTANCES, &LABELS, Criterion::Accuracy, DEFAULT_NUM_THRESHOLDS)
                .unwrap();
        assert_abs_diff_eq!(search.best.accuracy, 1.0, epsilon = 1e-9);
        assert!(search.best.threshold >= 1.0 && search.best.threshold < 2.0);
        assert_eq!(search.records.len(), DEFAULT_NUM_THRESHOLDS);
        assert_eq!(search.records[0].threshold, 0.0);
        assert_eq!(search.records[99].threshold, 4.0);

        for criterion in [Criterion::Youden, Criterion::F1] {
            let search = find_optimal_threshold(&DISTANCES, &LABELS, criterion, 5).unwrap();
            assert_eq!(search.best.threshold, 1.0);
            assert_abs_diff_eq!(search.best_score, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ties_keep_lowest_threshold() {
        // Every threshold in [1, 2) is perfect, the scan keeps the first
        let search = find_optimal_threshold(&DISTANCES, &LABELS, Criterion::Accuracy, 9).unwrap();
        assert_eq!(search.best.threshold, 1.0);
    }

    #[test]
    fn test_search_errors() {
        assert!(matches!(
            find_optimal_threshold(&[], &[], Criterion::Accuracy, 10),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            find_optimal_threshold(&[1.0], &[true], Criterion::Accuracy, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_constant_distances() {
        let labels = [true, false, true, false];
        let search = find_optimal_threshold(&[3.0; 4], &labels, Criterion::F1, 10).unwrap();
        assert!(search.records.iter().all(|r| r.threshold == 3.0));
        assert_eq!(search.best.true_positives, 2);
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!("Youden".parse::<Criterion>().unwrap(), Criterion::Youden);
        assert_eq!("F1".parse::<Criterion>().unwrap(), Criterion::F1);
        assert!(matches!(
            "auc".parse::<Criterion>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_roc_perfect_separation() {
        let roc = compute_roc(&DISTANCES, &LABELS).unwrap();
        assert_eq!(roc.points.len(), 6);
        assert_eq!(roc.points[0].distance_threshold, f64::NEG_INFINITY);
        assert_abs_diff_eq!(roc.auc, 1.0, epsilon = 1e-12);

        assert_eq!(roc.optimal_index, 2);
        assert_eq!(roc.optimal_threshold, 1.0);
        assert_eq!(roc.optimal_tpr, 1.0);
        assert_eq!(roc.optimal_fpr, 0.0);

        let last = roc.points.last().unwrap();
        assert_eq!((last.fpr, last.tpr), (1.0, 1.0));
    }

    #[test]
    fn test_roc_inverted_and_tied() {
        let inverted = [false, false, true, true, true];
        let roc = compute_roc(&DISTANCES, &inverted).unwrap();
        assert_abs_diff_eq!(roc.auc, 0.0, epsilon = 1e-12);

        // One shared distance: a single diagonal step
        let roc = compute_roc(&[1.0, 1.0], &[true, false]).unwrap();
        assert_eq!(roc.points.len(), 2);
        assert_abs_diff_eq!(roc.auc, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_roc_single_class() {
        let roc = compute_roc(&[1.0, 2.0], &[true, true]).unwrap();
        assert!(roc.points.iter().all(|p| p.fpr == 0.0));
        assert_eq!(roc.auc, 0.0);
        assert!(compute_roc(&[], &[]).is_err());
    }

    #[test]
    fn test_roc_nan_distance_gets_own_point() {
        // NaN sorts last under total ordering and forms its own group
        let roc = compute_roc(&[1.0, f64::NAN], &[true, false]).unwrap();
        assert_eq!(roc.points.len(), 3);
        assert_eq!(roc.points[1].distance_threshold, 1.0);
        assert!(roc.points[2].distance_threshold.is_nan());
        assert_eq!((roc.points[2].fpr, roc.points[2].tpr), (1.0, 1.0));
        assert_abs_diff_eq!(roc.auc, 1.0, epsilon = 1e-12);
    }
}
