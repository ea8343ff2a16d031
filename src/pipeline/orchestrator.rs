//! Claim checker: sequences the tool steps and collaborator calls for one
//! claim across candidate endpoints and bounded attempts.
//!
//! Per request:
//!
//! ```text
//! Classify ─► OutOfScope | NoDatasetSelected | ClassifierFailure
//!    │
//!    └─► for endpoint in candidates:
//!          for attempt in retry_delays:
//!            Connect → Discover (cache or fresh) → Indicators → SelectParams
//!            → Metadata → SelectFilters → Resolve → Fetch primary [+ benchmark]
//!            → [paginated: SelectFilters again → Refetch] → Interpret
//! ```
//!
//! A failed attempt discards its partial trace. Each `(endpoint, attempt)`
//! result goes through [`AttemptPlan::decide`], which names the next move.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::collaborators::{Collaborators, FilterRequest, InterpretRequest};
use super::config::PipelineConfig;
use super::discovery::DiscoveryCache;
use super::fetch::{FetchResult, Fetcher};
use super::normalize::normalize_series;
use super::outcome::{ClaimOutcome, OutOfScopeReport, VerdictReport};
use super::resolver::FilterResolver;
use super::trace::{DebugSink, Step, StepRecord, StepTrace};
use crate::core::dataset::{ClaimType, Dataset};
use crate::core::filters::{ApiParamSpec, FilterSet};
use crate::core::series::{NormalizedResult, SeriesPoint};
use crate::core::verdict::{ChartPoint, FilterSelection, Interpretation};
use crate::error::AttemptError;
use crate::mcp::gateway::{
    TOOL_DISCOVER, TOOL_INDICATORS, TOOL_METADATA, ToolGateway, ToolSession, call_tool,
    candidate_endpoints, connect,
};

/// Hint given to the filter selector when a fetch came back paginated.
pub const PAGINATION_HINT: &str = "Previous Step-4 results were paginated (totalPages>1). \
Include any aggregation/granularity field (e.g., level) and choose the highest aggregation \
that still matches the claim. Avoid extra subcategory filters.";

/// Shape of the retry space: how many endpoints, how many attempts each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPlan {
    /// Candidate endpoints.
    pub endpoints: usize,
    /// Attempts per endpoint.
    pub attempts: usize,
}

/// Zero-based position in the retry space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptPosition {
    /// Endpoint index.
    pub endpoint: usize,
    /// Attempt index within the endpoint.
    pub attempt: usize,
}

/// What to do after one `(endpoint, attempt)` finished.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptDecision {
    /// Try the same endpoint again.
    RetrySame,
    /// Move to the next endpoint's first attempt.
    AdvanceEndpoint,
    /// Stop with this outcome.
    Terminate(ClaimOutcome),
}

impl AttemptPlan {
    /// Decides the next move from the result of the attempt at `position`.
    #[must_use]
    pub fn decide(
        self,
        position: AttemptPosition,
        result: Result<VerdictReport, AttemptError>,
    ) -> AttemptDecision {
        match result {
            Ok(report) => AttemptDecision::Terminate(ClaimOutcome::Success(report)),
            Err(_) if position.attempt + 1 < self.attempts => AttemptDecision::RetrySame,
            Err(_) if position.endpoint + 1 < self.endpoints => AttemptDecision::AdvanceEndpoint,
            Err(_) => AttemptDecision::Terminate(ClaimOutcome::UpstreamUnavailable),
        }
    }
}

impl AttemptPosition {
    const fn apply(self, decision: &AttemptDecision) -> Self {
        match decision {
            AttemptDecision::RetrySame => Self {
                endpoint: self.endpoint,
                attempt: self.attempt + 1,
            },
            AttemptDecision::AdvanceEndpoint => Self {
                endpoint: self.endpoint + 1,
                attempt: 0,
            },
            AttemptDecision::Terminate(_) => self,
        }
    }
}

/// Labels for a paired result.
///
/// The first key (in key order) whose value differs between the two maps
/// names both sides as `key=value`; a side lacking the key renders `(unset)`.
/// Identical maps give `primary` / `benchmark`.
#[must_use]
pub fn label_from_filters(primary: &FilterSet, benchmark: &FilterSet) -> (String, String) {
    let keys: BTreeSet<&String> = primary.keys().chain(benchmark.keys()).collect();
    keys.into_iter()
        .find(|key| primary.get(*key) != benchmark.get(*key))
        .map_or_else(
            || ("primary".to_string(), "benchmark".to_string()),
            |key| {
                let render = |side: &FilterSet| {
                    format!("{key}={}", side.get(key).map_or("(unset)", String::as_str))
                };
                (render(primary), render(benchmark))
            },
        )
}

/// Cleans interpreter chart data: one point per year, first wins. When the
/// interpreter returned none, points are derived from the primary series.
#[must_use]
pub fn finalize_chart(
    chart: Vec<ChartPoint>,
    primary: &[SeriesPoint],
    label: &str,
) -> Vec<ChartPoint> {
    let mut seen = BTreeSet::new();
    let deduped: Vec<ChartPoint> = chart
        .into_iter()
        .filter(|point| seen.insert(point.year.clone()))
        .collect();
    if !deduped.is_empty() || primary.is_empty() {
        return deduped;
    }
    primary
        .iter()
        .map(|point| ChartPoint {
            year: point.period.clone(),
            value: point.value,
            label: Some(label.to_string()),
        })
        .collect()
}

/// Resolved primary and benchmark filters for one fetch round.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeriesPlan {
    primary: FilterSet,
    benchmark: Option<FilterSet>,
    drops: Vec<String>,
}

impl SeriesPlan {
    fn new(selection: FilterSelection, claim_type: ClaimType, resolver: &FilterResolver) -> Self {
        let benchmark = selection
            .benchmark_filters
            .filter(|_| claim_type.wants_benchmark())
            .map(|filters| resolver.resolve(&filters))
            .filter(|filters| !filters.is_empty());
        Self {
            primary: resolver.resolve(&selection.filters),
            benchmark,
            drops: selection.optional_drop_filters,
        }
    }
}

/// Fetched rows of one round, already reduced to series.
struct Fetched {
    primary: Vec<SeriesPoint>,
    benchmark: Option<Vec<SeriesPoint>>,
    paginated: bool,
}

/// What the current claim is about, fixed before the first attempt.
struct ClaimJob<'a> {
    claim: &'a str,
    dataset: Dataset,
    indicator_hint: &'a str,
}

/// Verifies claims. Cheap to clone; clones share every cache.
#[derive(Clone)]
pub struct ClaimChecker {
    gateway: Arc<dyn ToolGateway>,
    collaborators: Arc<dyn Collaborators>,
    discovery: Arc<DiscoveryCache>,
    config: Arc<PipelineConfig>,
    debug: DebugSink,
}

impl ClaimChecker {
    /// Creates a checker. The discovery cache is injected so several
    /// checkers (or tests) can share or isolate it.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ToolGateway>,
        collaborators: Arc<dyn Collaborators>,
        discovery: Arc<DiscoveryCache>,
        config: PipelineConfig,
    ) -> Self {
        let debug = config
            .debug_dir
            .clone()
            .map_or_else(DebugSink::disabled, DebugSink::new);
        Self {
            gateway,
            collaborators,
            discovery,
            config: Arc::new(config),
            debug,
        }
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Checks one claim. Always yields exactly one outcome; a panic inside
    /// the pipeline becomes [`ClaimOutcome::UnexpectedFailure`].
    pub async fn check(&self, claim: &str) -> ClaimOutcome {
        let checker = self.clone();
        let claim = claim.to_string();
        let span = info_span!("claim.check", claim_len = claim.len());
        let task = tokio::spawn(async move { checker.run(&claim).await }.instrument(span));
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "claim check aborted");
                ClaimOutcome::UnexpectedFailure
            }
        }
    }

    async fn run(&self, claim: &str) -> ClaimOutcome {
        let overview = self.discovery.get();
        let classification = match self
            .collaborators
            .classify(claim, overview.as_deref())
            .await
        {
            Ok(classification) => classification,
            Err(e) => {
                error!(error = %e, "classifier failed");
                return ClaimOutcome::ClassifierFailure;
            }
        };

        if !classification.is_answerable {
            info!("claim is out of scope");
            return ClaimOutcome::OutOfScope(OutOfScopeReport::default());
        }
        let Some(selection) = classification.datasets.into_iter().next() else {
            warn!("classifier selected no dataset");
            return ClaimOutcome::NoDatasetSelected;
        };

        let indicator_hint = selection
            .indicator_hint
            .filter(|hint| !hint.trim().is_empty())
            .unwrap_or_else(|| claim.to_string());
        let job = ClaimJob {
            claim,
            dataset: selection.dataset,
            indicator_hint: &indicator_hint,
        };
        info!(dataset = %job.dataset, "claim classified");

        let outcome = match self.config.request_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.attempt_all(&job))
                .await
                .unwrap_or_else(|_| {
                    warn!(?deadline, "request deadline elapsed");
                    ClaimOutcome::UpstreamUnavailable
                }),
            None => self.attempt_all(&job).await,
        };
        info!(outcome = outcome.kind(), "claim check finished");
        outcome
    }

    async fn attempt_all(&self, job: &ClaimJob<'_>) -> ClaimOutcome {
        let endpoints = candidate_endpoints(&self.config.mcp_url);
        let plan = AttemptPlan {
            endpoints: endpoints.len(),
            attempts: self.config.retry_delays.len(),
        };
        let mut position = AttemptPosition::default();

        loop {
            let Some(endpoint) = endpoints.get(position.endpoint) else {
                return ClaimOutcome::UpstreamUnavailable;
            };
            let delay = self
                .config
                .retry_delays
                .get(position.attempt)
                .copied()
                .unwrap_or(Duration::ZERO);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = self.run_attempt(endpoint, job).await;
            if let Err(e) = &result {
                warn!(
                    endpoint = %endpoint,
                    attempt = position.attempt + 1,
                    step = e.step(),
                    error = %e,
                    "attempt failed"
                );
            }

            let decision = plan.decide(position, result);
            if let AttemptDecision::Terminate(outcome) = decision {
                return outcome;
            }
            position = position.apply(&decision);
        }
    }

    async fn run_attempt(
        &self,
        endpoint: &str,
        job: &ClaimJob<'_>,
    ) -> Result<VerdictReport, AttemptError> {
        let session = connect(self.gateway.as_ref(), endpoint, self.config.tool_timeout).await?;
        let result = self.drive(session.as_ref(), job).await;
        session.close().await;
        result
    }

    async fn drive(
        &self,
        session: &dyn ToolSession,
        job: &ClaimJob<'_>,
    ) -> Result<VerdictReport, AttemptError> {
        let timeout = self.config.tool_timeout;
        let dataset = job.dataset;
        let mut trace = StepTrace::new();

        self.discover(session, &mut trace).await?;

        let mut args = Map::new();
        args.insert("dataset".to_string(), json!(dataset.code()));
        args.insert("user_query".to_string(), json!(job.indicator_hint));
        let indicators = call_tool(session, TOOL_INDICATORS, args, timeout).await?;
        trace.push(StepRecord::new(
            Step::Indicators,
            format!("Found indicators for {dataset}"),
            "Indicator list retrieved",
            indicators.elapsed,
            &indicators.payload,
        ));

        let selection = self
            .collaborators
            .select_indicator(job.claim, dataset, &indicators.payload)
            .await
            .map_err(|e| AttemptError::collaborator("selector_a", e))?;
        self.debug.write("debug_selector_a_api.json", &selection);
        debug!(claim_type = selection.claim_type.as_str(), "indicator parameters selected");

        let mut args = Map::new();
        args.insert("dataset".to_string(), json!(dataset.code()));
        for (key, value) in &selection.params {
            args.insert(key.clone(), json!(value));
        }
        let metadata = call_tool(session, TOOL_METADATA, args, timeout).await?;
        trace.push(StepRecord::new(
            Step::Filters,
            format!("Retrieved valid filters for {dataset}"),
            "Filter metadata retrieved",
            metadata.elapsed,
            &metadata.payload,
        ));

        let spec = ApiParamSpec::from_metadata(&metadata.payload);
        let resolver = FilterResolver::from_metadata(&metadata.payload);
        let mut request = FilterRequest {
            claim: job.claim,
            dataset,
            claim_type: selection.claim_type,
            metadata: &metadata.payload,
            indicator_params: &selection.params,
            pagination_hint: None,
        };

        let filters = self
            .collaborators
            .select_filters(request)
            .await
            .map_err(|e| AttemptError::collaborator("selector_b", e))?;
        self.debug.write("debug_selector_b_api.json", &filters);
        let mut plan = SeriesPlan::new(filters, selection.claim_type, &resolver);

        let fetcher = Fetcher::new(session, dataset, &spec, timeout, &self.debug);
        let mut fetch_trace = StepTrace::new();
        let mut fetched = fetch_round(&fetcher, &plan, "", &mut fetch_trace).await?;

        if fetched.paginated {
            info!("fetch was paginated, refining filters");
            request.pagination_hint = Some(PAGINATION_HINT);
            let refined = self
                .collaborators
                .select_filters(request)
                .await
                .map_err(|e| AttemptError::collaborator("selector_b_retry", e))?;
            self.debug.write("debug_selector_b_api_retry.json", &refined);
            plan = SeriesPlan::new(refined, selection.claim_type, &resolver);
            fetched = fetch_round(&fetcher, &plan, "_retry", &mut fetch_trace).await?;
        }
        trace.append(&mut fetch_trace);

        let data = match (&plan.benchmark, fetched.benchmark) {
            (Some(benchmark_filters), Some(benchmark)) => {
                let (primary_label, benchmark_label) =
                    label_from_filters(&plan.primary, benchmark_filters);
                NormalizedResult::Paired {
                    primary_label,
                    benchmark_label,
                    primary: fetched.primary,
                    benchmark,
                }
            }
            _ => NormalizedResult::Series(fetched.primary),
        };

        let source_hint = dataset.source_hint();
        let interpretation = self
            .collaborators
            .interpret(InterpretRequest {
                claim: job.claim,
                dataset,
                indicator: job.indicator_hint,
                filters: &plan.primary,
                data: &data,
                source_hint: &source_hint,
            })
            .await
            .map_err(|e| AttemptError::collaborator("interpreter", e))?;

        let chart_data = finalize_chart(
            interpretation.chart_data,
            data.primary(),
            job.indicator_hint,
        );
        Ok(VerdictReport::new(
            Interpretation {
                chart_data,
                ..interpretation
            },
            trace,
        ))
    }

    async fn discover(
        &self,
        session: &dyn ToolSession,
        trace: &mut StepTrace,
    ) -> Result<(), AttemptError> {
        if let Some(cached) = self.discovery.get() {
            trace.push(StepRecord::new(
                Step::Discover,
                "Used cached dataset overview",
                "Dataset overview cached",
                Duration::ZERO,
                &cached,
            ));
            return Ok(());
        }

        let output = call_tool(session, TOOL_DISCOVER, Map::new(), self.config.tool_timeout).await?;
        trace.push(StepRecord::new(
            Step::Discover,
            "Asked MoSPI what datasets are available",
            "Dataset overview retrieved",
            output.elapsed,
            &output.payload,
        ));
        self.discovery.store(output.payload);
        Ok(())
    }
}

/// Fetches the primary series and, when planned, the benchmark.
async fn fetch_round(
    fetcher: &Fetcher<'_>,
    plan: &SeriesPlan,
    suffix: &str,
    trace: &mut StepTrace,
) -> Result<Fetched, AttemptError> {
    let primary: FetchResult = fetcher
        .fetch(&plan.primary, &plan.drops, &format!("primary{suffix}"), trace)
        .await?;
    let mut paginated = primary.paginated;

    let benchmark = match &plan.benchmark {
        Some(filters) => {
            let result = fetcher
                .fetch(filters, &plan.drops, &format!("benchmark{suffix}"), trace)
                .await?;
            paginated |= result.paginated;
            Some(normalize_series(result.rows, filters))
        }
        None => None,
    };

    Ok(Fetched {
        primary: normalize_series(primary.rows, &plan.primary),
        benchmark,
        paginated,
    })
}
