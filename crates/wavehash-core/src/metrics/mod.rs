// Similarity metric, threshold evaluation and reporting
pub mod distance;
pub mod evaluation;
pub mod pairs;
pub mod report;

pub use distance::{hamming_distance, normalized_distance, similarity};
pub use evaluation::{
    classify, compute_roc, find_optimal_threshold, Criterion, EvaluationRecord, RocCurve,
    RocPoint, ThresholdSearch, DEFAULT_NUM_THRESHOLDS,
};
pub use pairs::{evaluate_pairs, LabeledPair, PairDistances};
pub use report::{format_metrics_table, MetricColumn, DEFAULT_COLUMNS};
