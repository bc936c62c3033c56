//! Plain-text comparison tables for evaluation results.

use crate::metrics::evaluation::EvaluationRecord;

/// A column of [`format_metrics_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricColumn {
    Accuracy,
    Sensitivity,
    Specificity,
    Precision,
    F1,
    Threshold,
    TruePositives,
    FalsePositives,
}

pub const DEFAULT_COLUMNS: [MetricColumn; 5] = [
    MetricColumn::Accuracy,
    MetricColumn::Sensitivity,
    MetricColumn::Specificity,
    MetricColumn::F1,
    MetricColumn::Threshold,
];

impl MetricColumn {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Accuracy => "Accuracy",
            Self::Sensitivity => "Sensitivity",
            Self::Specificity => "Specificity",
            Self::Precision => "Precision",
            Self::F1 => "F1",
            Self::Threshold => "Threshold",
            Self::TruePositives => "TP",
            Self::FalsePositives => "FP",
        }
    }

    fn format(&self, record: &EvaluationRecord) -> String {
        match self {
            Self::Accuracy => format!("{:.4}", record.accuracy),
            Self::Sensitivity => format!("{:.4}", record.sensitivity),
            Self::Specificity => format!("{:.4}", record.specificity),
            Self::Precision => format!("{:.4}", record.precision),
            Self::F1 => format!("{:.4}", record.f1),
            Self::Threshold => format!("{:.4}", record.threshold),
            Self::TruePositives => record.true_positives.to_string(),
            Self::FalsePositives => record.false_positives.to_string(),
        }
    }
}

/// Render named evaluation results as a table, one row per method.
/// An empty `columns` slice selects [`DEFAULT_COLUMNS`].
pub fn format_metrics_table(
    rows: &[(String, EvaluationRecord)],
    columns: &[MetricColumn],
) -> String {
    let columns = if columns.is_empty() {
        &DEFAULT_COLUMNS[..]
    } else {
        columns
    };

    let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
    let header = format!("| Method | {} |", headers.join(" | "));
    let separator = format!("|{}|", "-".repeat(header.len().saturating_sub(2)));

    let mut lines = vec![separator.clone(), header, separator.clone()];
    for (name, record) in rows {
        let values: Vec<String> = columns.iter().map(|c| c.format(record)).collect();
        lines.push(format!("| {} | {} |", name, values.join(" | ")));
    }
    lines.push(separator);

    lines.join("\n")
}
