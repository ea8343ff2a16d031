//! Verification engine.
//!
//! [`ClaimChecker`] drives one claim through classification, the four tool
//! steps and interpretation. The leaves are usable on their own:
//! [`FilterResolver`] validates proposed filters against metadata,
//! [`Fetcher`] fans a logical fetch out into tool calls, [`normalize`]
//! turns rows into series, and [`RateLimiter`] gates the HTTP front.

pub mod collaborators;
pub mod config;
pub mod discovery;
pub mod fetch;
pub mod normalize;
pub mod orchestrator;
pub mod outcome;
pub mod rate_limit;
pub mod resolver;
pub mod trace;

pub use collaborators::{Collaborators, FilterRequest, InterpretRequest};
pub use config::PipelineConfig;
pub use discovery::DiscoveryCache;
pub use fetch::{FetchResult, Fetcher, expand_filters};
pub use orchestrator::{
    AttemptDecision, AttemptPlan, AttemptPosition, ClaimChecker, PAGINATION_HINT,
    label_from_filters,
};
pub use outcome::{ClaimOutcome, ErrorBody, OutOfScopeReport, VerdictReport};
pub use rate_limit::RateLimiter;
pub use resolver::FilterResolver;
pub use trace::{DebugSink, Step, StepRecord, StepTrace};
