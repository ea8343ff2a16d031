//! Normalized series handed to the interpreter.

use serde::{Deserialize, Serialize};

/// One observation: a period (`YYYY` or `YYYY-MM`) and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Year or year-month.
    pub period: String,
    /// Observed value.
    pub value: f64,
}

/// Data passed to the interpreter, built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedResult {
    /// Primary and benchmark series side by side.
    Paired {
        /// Label of the primary series (`key=value` or `primary`).
        primary_label: String,
        /// Label of the benchmark series (`key=value` or `benchmark`).
        benchmark_label: String,
        /// Primary series.
        primary: Vec<SeriesPoint>,
        /// Benchmark series.
        benchmark: Vec<SeriesPoint>,
    },
    /// A single series ordered by period.
    Series(Vec<SeriesPoint>),
}

impl NormalizedResult {
    /// The primary series regardless of shape.
    #[must_use]
    pub fn primary(&self) -> &[SeriesPoint] {
        match self {
            Self::Series(points) | Self::Paired { primary: points, .. } => points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(period: &str, value: f64) -> SeriesPoint {
        SeriesPoint {
            period: period.to_string(),
            value,
        }
    }

    #[test]
    fn test_series_serializes_as_array() {
        let result = NormalizedResult::Series(vec![point("2023", 1.5)]);
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json, serde_json::json!([{"period": "2023", "value": 1.5}]));
    }

    #[test]
    fn test_paired_serializes_with_labels() {
        let result = NormalizedResult::Paired {
            primary_label: "sector=1".to_string(),
            benchmark_label: "sector=2".to_string(),
            primary: vec![point("2022", 1.0)],
            benchmark: vec![],
        };
        let json = serde_json::to_value(&result).unwrap_or_default();
        assert_eq!(json["primary_label"], "sector=1");
        assert_eq!(result.primary().len(), 1);
    }
}
