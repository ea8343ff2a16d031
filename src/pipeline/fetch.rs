//! Fan-out data fetching.
//!
//! One logical fetch may become several `4_get_data` calls: comma lists on
//! non-time keys expand into one request per combination, while time keys
//! travel as a single comma-joined value. A fetch that returns no rows is
//! retried once with optional filters dropped.

use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::debug;

use super::normalize::{Row, extract_rows};
use super::trace::{DebugSink, Step, StepRecord, StepTrace};
use crate::core::dataset::Dataset;
use crate::core::filters::{ApiParamSpec, FilterSet, is_time_like};
use crate::error::ToolError;
use crate::mcp::gateway::{TOOL_DATA, ToolSession, call_tool};

/// Entries kept in a comma-joined time value.
pub const MAX_TIME_VALUES: usize = 5;
/// Filters removed at most by the empty-result retry.
pub const MAX_DROPPED_FILTERS: usize = 3;
/// Page size injected when the dataset takes one and the caller gave none.
pub const DEFAULT_PAGE_LIMIT: &str = "100";

/// Rows of one logical fetch and whether upstream reported more pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    /// Rows across every sub-call.
    pub rows: Vec<Row>,
    /// Sticky: set if any sub-call reported `meta_data.totalPages > 1`.
    pub paginated: bool,
}

impl FetchResult {
    fn absorb(&mut self, other: Self) {
        self.rows.extend(other.rows);
        self.paginated |= other.paginated;
    }
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Expands a filter set into the filter sets actually sent upstream.
///
/// Time-like keys keep one comma-joined value, cut to the first
/// [`MAX_TIME_VALUES`] entries. Every other comma list multiplies the
/// requests: the result is the Cartesian product over all such keys.
#[must_use]
pub fn expand_filters(filters: &FilterSet) -> Vec<FilterSet> {
    let mut expanded = vec![filters.clone()];
    for (key, value) in filters {
        if !value.contains(',') {
            continue;
        }
        let parts = split_list(value);
        if is_time_like(key) {
            if parts.len() > MAX_TIME_VALUES {
                let joined = parts[..MAX_TIME_VALUES].join(",");
                for set in &mut expanded {
                    set.insert(key.clone(), joined.clone());
                }
            }
            continue;
        }
        expanded = expanded
            .into_iter()
            .flat_map(|set| {
                parts.iter().map(move |part| {
                    let mut next = set.clone();
                    next.insert(key.clone(), (*part).to_string());
                    next
                })
            })
            .collect();
    }
    expanded
}

/// Whether a payload reports `meta_data.totalPages > 1`.
#[must_use]
pub fn reports_more_pages(payload: &Value) -> bool {
    payload
        .get("meta_data")
        .and_then(|meta| meta.get("totalPages"))
        .and_then(Value::as_f64)
        .is_some_and(|pages| pages > 1.0)
}

/// Filters the empty-result retry may remove.
///
/// Candidates come from the selector's drop list, in its order; keys not in
/// use and required parameters are skipped.
#[must_use]
pub fn droppable_filters<'a>(
    filters: &FilterSet,
    optional_drops: &'a [String],
    spec: &ApiParamSpec,
) -> Vec<&'a str> {
    let required = spec.required();
    optional_drops
        .iter()
        .map(String::as_str)
        .filter(|key| filters.contains_key(*key) && !required.contains(key))
        .take(MAX_DROPPED_FILTERS)
        .collect()
}

/// Issues the data calls for one dataset within an open session.
pub struct Fetcher<'a> {
    session: &'a dyn ToolSession,
    dataset: Dataset,
    spec: &'a ApiParamSpec,
    timeout: Duration,
    debug: &'a DebugSink,
}

impl<'a> Fetcher<'a> {
    /// Creates a fetcher bound to a session and the dataset's parameters.
    pub const fn new(
        session: &'a dyn ToolSession,
        dataset: Dataset,
        spec: &'a ApiParamSpec,
        timeout: Duration,
        debug: &'a DebugSink,
    ) -> Self {
        Self {
            session,
            dataset,
            spec,
            timeout,
            debug,
        }
    }

    /// Fetches one series, retrying once with optional filters dropped when
    /// nothing comes back.
    ///
    /// `label` names the series in the trace (`primary`, `benchmark`, ...).
    /// Every sub-call appends a [`Step::Fetch`] record to `trace`.
    pub async fn fetch(
        &self,
        filters: &FilterSet,
        optional_drops: &[String],
        label: &str,
        trace: &mut StepTrace,
    ) -> Result<FetchResult, ToolError> {
        let mut result = self.run(filters, label, "primary", trace).await?;
        if !result.rows.is_empty() {
            return Ok(result);
        }

        let drops = droppable_filters(filters, optional_drops, self.spec);
        if drops.is_empty() {
            debug!(label, "empty fetch with nothing to drop");
            return Ok(result);
        }

        debug!(label, ?drops, "empty fetch, retrying with fewer filters");
        let reduced: FilterSet = filters
            .iter()
            .filter(|(key, _)| !drops.contains(&key.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let retry = self.run(&reduced, label, "retry", trace).await?;
        result.absorb(retry);
        Ok(result)
    }

    async fn run(
        &self,
        filters: &FilterSet,
        label: &str,
        attempt: &str,
        trace: &mut StepTrace,
    ) -> Result<FetchResult, ToolError> {
        let mut base = filters.clone();
        for (param, default) in [("limit", DEFAULT_PAGE_LIMIT), ("page", "1")] {
            if self.spec.declares(param) && !base.contains_key(param) {
                base.insert(param.to_string(), default.to_string());
            }
        }

        let mut result = FetchResult::default();
        for (idx, one) in expand_filters(&base).into_iter().enumerate() {
            let mut args = Map::new();
            args.insert("dataset".to_string(), json!(self.dataset.code()));
            args.insert("filters".to_string(), json!(one));

            let output = call_tool(self.session, TOOL_DATA, args, self.timeout).await?;
            let payload = output.payload;

            self.debug
                .write(&format!("debug_step4_{label}_{attempt}_{idx}.json"), &payload);
            self.debug
                .write(&format!("debug_step4_{label}_{attempt}_{idx}_filters.json"), &one);

            let outcome = payload
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("Data retrieved")
                .to_string();
            trace.push(StepRecord::new(
                Step::Fetch,
                format!("Fetched data for {} ({label}, {attempt})", self.dataset),
                outcome,
                output.elapsed,
                &payload,
            ));

            result.absorb(FetchResult {
                paginated: reports_more_pages(&payload),
                rows: extract_rows(&payload),
            });
        }
        debug!(
            label,
            attempt,
            rows = result.rows.len(),
            paginated = result.paginated,
            "fetch finished"
        );
        Ok(result)
    }
}
