//! Shared data model.
//!
//! These types sit below both the collaborator adapters in [`crate::agent`]
//! and the verification engine in [`crate::pipeline`], so neither depends on
//! the other for its vocabulary.

pub mod dataset;
pub mod filters;
pub mod series;
pub mod verdict;

pub use dataset::{ClaimType, Dataset};
pub use filters::{ApiParam, ApiParamSpec, FilterSet, is_time_like};
pub use series::{NormalizedResult, SeriesPoint};
pub use verdict::{
    ChartPoint, Classification, DatasetSelection, FilterSelection, IndicatorSelection,
    Interpretation, Verdict,
};
