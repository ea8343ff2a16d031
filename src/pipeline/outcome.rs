//! Terminal outcomes of a claim check and their response bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::trace::StepTrace;
use crate::core::verdict::{ChartPoint, Interpretation, Verdict};

/// Explanation returned for claims outside the datasets' reach.
pub const OUT_OF_SCOPE_EXPLANATION: &str =
    "This question can't be answered using government economic statistics.";

/// Topics listed alongside an out-of-scope answer.
pub const AVAILABLE_TOPICS: &str = "Employment & wages (PLFS), retail inflation (CPI), \
wholesale prices (WPI), industrial output (IIP, ASI), GDP & national accounts (NAS), \
and energy statistics.";

/// Successful verdict with the trace of the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictReport {
    /// Verdict.
    pub verdict: Verdict,
    /// Short numeric summary.
    pub headline_stat: String,
    /// Explanation for the reader.
    pub explanation: String,
    /// Chart points, one per period.
    pub chart_data: Vec<ChartPoint>,
    /// Attribution.
    pub source: String,
    /// Tool steps of the successful attempt.
    pub mcp_steps: StepTrace,
}

impl VerdictReport {
    /// Combines an interpretation with the trace that led to it.
    #[must_use]
    pub fn new(interpretation: Interpretation, mcp_steps: StepTrace) -> Self {
        Self {
            verdict: interpretation.verdict,
            headline_stat: interpretation.headline_stat,
            explanation: interpretation.explanation,
            chart_data: interpretation.chart_data,
            source: interpretation.source,
            mcp_steps,
        }
    }
}

/// Answer for claims the datasets cannot address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutOfScopeReport {
    /// Always `out_of_scope`.
    pub verdict: String,
    /// Fixed explanation.
    pub explanation: String,
    /// Topics the service can check.
    pub available_topics: String,
    /// Always empty: no tool was called.
    pub mcp_steps: StepTrace,
    /// Always `true`.
    pub out_of_scope: bool,
}

impl Default for OutOfScopeReport {
    fn default() -> Self {
        Self {
            verdict: "out_of_scope".to_string(),
            explanation: OUT_OF_SCOPE_EXPLANATION.to_string(),
            available_topics: AVAILABLE_TOPICS.to_string(),
            mcp_steps: StepTrace::new(),
            out_of_scope: true,
        }
    }
}

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `true`.
    pub error: bool,
    /// User-safe message.
    pub message: String,
}

impl ErrorBody {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// Exactly one of these ends every claim check.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Verdict produced.
    Success(VerdictReport),
    /// The classifier judged the claim unanswerable.
    OutOfScope(OutOfScopeReport),
    /// The classifier named no dataset.
    NoDatasetSelected,
    /// The classifier itself failed.
    ClassifierFailure,
    /// Every endpoint and attempt failed, or the deadline passed.
    UpstreamUnavailable,
    /// Anything else.
    UnexpectedFailure,
}

impl ClaimOutcome {
    /// Fixed message for failure outcomes, `None` for answers.
    #[must_use]
    pub const fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) | Self::OutOfScope(_) => None,
            Self::NoDatasetSelected => Some("No dataset selected"),
            Self::ClassifierFailure => Some("Classifier failed"),
            Self::UpstreamUnavailable => Some("MCP server not responding"),
            Self::UnexpectedFailure => Some("Unexpected error"),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::OutOfScope(_) => "out_of_scope",
            Self::NoDatasetSelected => "no_dataset",
            Self::ClassifierFailure => "classifier_failure",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }

    /// JSON body for this outcome.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let body = match self {
            Self::Success(report) => serde_json::to_value(report),
            Self::OutOfScope(report) => serde_json::to_value(report),
            other => serde_json::to_value(ErrorBody::new(
                other.error_message().unwrap_or("Unexpected error"),
            )),
        };
        body.unwrap_or_else(|_| serde_json::json!({"error": true, "message": "Unexpected error"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_out_of_scope_body() {
        let body = ClaimOutcome::OutOfScope(OutOfScopeReport::default()).to_body();
        assert_eq!(body["verdict"], "out_of_scope");
        assert_eq!(body["outOfScope"], true);
        assert_eq!(body["mcpSteps"], json!([]));
        assert!(body["availableTopics"].as_str().is_some_and(|t| t.contains("PLFS")));
    }

    #[test]
    fn test_error_bodies_use_fixed_messages() {
        assert_eq!(
            ClaimOutcome::UpstreamUnavailable.to_body(),
            json!({"error": true, "message": "MCP server not responding"})
        );
        assert_eq!(
            ClaimOutcome::ClassifierFailure.error_message(),
            Some("Classifier failed")
        );
        assert_eq!(ClaimOutcome::NoDatasetSelected.kind(), "no_dataset");
    }

    #[test]
    fn test_verdict_report_camel_case() {
        let report = VerdictReport::new(
            Interpretation {
                verdict: Verdict::Confirmed,
                headline_stat: "4.2%".to_string(),
                explanation: "Yes.".to_string(),
                chart_data: vec![],
                source: "CPI (MoSPI)".to_string(),
            },
            StepTrace::new(),
        );
        let body = ClaimOutcome::Success(report).to_body();
        assert_eq!(body["verdict"], "confirmed");
        assert_eq!(body["headlineStat"], "4.2%");
        assert!(body.get("chartData").is_some());
    }
}
