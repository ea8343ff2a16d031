//! Collaborator contract types: classification, selections, interpretation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::dataset::{ClaimType, Dataset};
use super::filters::{FilterSet, deserialize_filter_set, deserialize_opt_filter_set};

/// Output of the classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    /// Whether government statistics can answer the claim at all.
    #[serde(default)]
    pub is_answerable: bool,
    /// Short rationale, for logs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Candidate datasets, most relevant first. Entries naming a code
    /// outside [`Dataset::ALL`] are skipped.
    #[serde(default, deserialize_with = "deserialize_known_datasets")]
    pub datasets: Vec<DatasetSelection>,
}

fn deserialize_known_datasets<'de, D>(deserializer: D) -> Result<Vec<DatasetSelection>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Array(entries)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<DatasetSelection>(entry) {
            Ok(selection) => Some(selection),
            Err(e) => {
                debug!(error = %e, "skipping unusable dataset entry");
                None
            }
        })
        .collect())
}

/// A dataset chosen by the classifier plus a hint for indicator lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSelection {
    /// Dataset code.
    pub dataset: Dataset,
    /// Free-text hint passed to the indicator tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_hint: Option<String>,
}

/// Output of Selector-A: metadata parameters and the claim shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSelection {
    /// Parameters forwarded to the metadata tool.
    #[serde(default, deserialize_with = "deserialize_filter_set")]
    pub params: FilterSet,
    /// Claim classification.
    #[serde(default)]
    pub claim_type: ClaimType,
}

/// Output of Selector-B: proposed data filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Filters for the primary series.
    #[serde(default, deserialize_with = "deserialize_filter_set")]
    pub filters: FilterSet,
    /// Filters for the benchmark series, if any.
    #[serde(default, deserialize_with = "deserialize_opt_filter_set")]
    pub benchmark_filters: Option<FilterSet>,
    /// Keys that may be removed if a fetch returns nothing.
    #[serde(default)]
    pub optional_drop_filters: Vec<String>,
}

/// Verdict on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The data contradicts the claim.
    Busted,
    /// The data supports the claim.
    Confirmed,
    /// The data is mixed or incomplete.
    Complicated,
}

/// One point of the chart shown next to the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Year or year-month.
    pub year: String,
    /// Metric value.
    pub value: f64,
    /// What the value measures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Output of the interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    /// Verdict.
    pub verdict: Verdict,
    /// Short numeric summary.
    pub headline_stat: String,
    /// Two to four sentences.
    pub explanation: String,
    /// Primary series as chart points.
    #[serde(default)]
    pub chart_data: Vec<ChartPoint>,
    /// Dataset and year attribution.
    pub source: String,
}
