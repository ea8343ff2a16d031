//! The four judgment calls the pipeline delegates.
//!
//! The engine never talks to a model directly. It hands a claim and the
//! payloads gathered so far to a [`Collaborators`] implementation and gets
//! back typed decisions.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::dataset::{ClaimType, Dataset};
use crate::core::filters::FilterSet;
use crate::core::series::NormalizedResult;
use crate::core::verdict::{Classification, FilterSelection, IndicatorSelection, Interpretation};
use crate::error::AgentError;

/// Inputs for choosing data filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterRequest<'a> {
    /// Claim text.
    pub claim: &'a str,
    /// Dataset being queried.
    pub dataset: Dataset,
    /// Claim shape from the indicator step.
    pub claim_type: ClaimType,
    /// Filter metadata payload.
    pub metadata: &'a Value,
    /// Parameters chosen at the indicator step.
    pub indicator_params: &'a FilterSet,
    /// Set on the re-selection after a paginated fetch.
    pub pagination_hint: Option<&'a str>,
}

/// Inputs for the final verdict.
#[derive(Debug, Clone, Copy)]
pub struct InterpretRequest<'a> {
    /// Claim text.
    pub claim: &'a str,
    /// Dataset the data came from.
    pub dataset: Dataset,
    /// Indicator hint, or the claim when the classifier gave none.
    pub indicator: &'a str,
    /// Final primary filters.
    pub filters: &'a FilterSet,
    /// Normalized series.
    pub data: &'a NormalizedResult,
    /// Attribution hint, e.g. `CPI (MoSPI)`.
    pub source_hint: &'a str,
}

/// Decision makers consulted by the claim checker.
#[async_trait]
pub trait Collaborators: Send + Sync {
    /// Decides whether the claim is answerable and which datasets to use.
    async fn classify(
        &self,
        claim: &str,
        overview: Option<&Value>,
    ) -> Result<Classification, AgentError>;

    /// Picks metadata parameters and the claim shape.
    async fn select_indicator(
        &self,
        claim: &str,
        dataset: Dataset,
        indicators: &Value,
    ) -> Result<IndicatorSelection, AgentError>;

    /// Picks primary and benchmark data filters.
    async fn select_filters(
        &self,
        request: FilterRequest<'_>,
    ) -> Result<FilterSelection, AgentError>;

    /// Judges the claim against the data.
    async fn interpret(
        &self,
        request: InterpretRequest<'_>,
    ) -> Result<Interpretation, AgentError>;
}
