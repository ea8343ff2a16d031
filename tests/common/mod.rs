//! In-memory fakes of the tool server and the collaborators.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use claimcheck::core::{
    ChartPoint, ClaimType, Classification, Dataset, DatasetSelection, FilterSelection, FilterSet,
    IndicatorSelection, Interpretation, Verdict,
};
use claimcheck::error::{AgentError, ToolError};
use claimcheck::mcp::{RawToolResult, TOOL_DATA, TOOL_DISCOVER, TOOL_INDICATORS, TOOL_METADATA};
use claimcheck::mcp::{ToolGateway, ToolSession};
use claimcheck::pipeline::{
    ClaimChecker, Collaborators, DiscoveryCache, FilterRequest, InterpretRequest, PipelineConfig,
};

pub const BASE_URL: &str = "http://upstream.test";

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn filters(pairs: &[(&str, &str)]) -> FilterSet {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Pipeline config with no backoff delays.
pub fn fast_config() -> PipelineConfig {
    PipelineConfig::builder()
        .mcp_url(BASE_URL)
        .retry_delays(vec![Duration::ZERO; 3])
        .build()
        .unwrap_or_else(|_| unreachable!())
}

pub fn checker(
    gateway: &Arc<FakeGateway>,
    collaborators: &Arc<FakeCollaborators>,
    config: PipelineConfig,
) -> ClaimChecker {
    ClaimChecker::new(
        gateway.clone(),
        collaborators.clone(),
        Arc::new(DiscoveryCache::new()),
        config,
    )
}

type DataFn = dyn Fn(&Value) -> Value + Send + Sync;

struct Shared {
    refuse: Vec<String>,
    metadata: Value,
    data: Box<DataFn>,
    connects: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, Value)>>,
}

/// Tool server answering by tool name.
pub struct FakeGateway {
    shared: Arc<Shared>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::build(Vec::new(), default_metadata(), Box::new(|_| cpi_rows()))
    }

    pub fn build(refuse: Vec<String>, metadata: Value, data: Box<DataFn>) -> Self {
        Self {
            shared: Arc::new(Shared {
                refuse,
                metadata,
                data,
                connects: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Endpoints connected to, in order.
    pub fn connects(&self) -> Vec<String> {
        lock(&self.shared.connects).clone()
    }

    /// Arguments of every call to `tool`, in order.
    pub fn calls(&self, tool: &str) -> Vec<Value> {
        lock(&self.shared.calls)
            .iter()
            .filter(|(name, _)| name == tool)
            .map(|(_, args)| args.clone())
            .collect()
    }
}

pub fn default_metadata() -> Value {
    json!({
        "api_params": [
            {"name": "year", "required": true},
            {"name": "sector"},
            {"name": "group"}
        ],
        "data": {
            "sector": [
                {"sector_code": "1", "sector_name": "Rural"},
                {"sector_code": "2", "sector_name": "Urban"}
            ]
        }
    })
}

pub fn cpi_rows() -> Value {
    json!({
        "msg": "Data fetched",
        "data": [
            {"year": "2021", "value": 5.1},
            {"year": "2022", "value": 6.7},
            {"year": "2023", "value": 5.4},
            {"year": "2023", "value": 9.9}
        ]
    })
}

struct FakeSession {
    shared: Arc<Shared>,
}

#[async_trait]
impl ToolGateway for FakeGateway {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn ToolSession>, ToolError> {
        lock(&self.shared.connects).push(endpoint.to_string());
        if self.shared.refuse.iter().any(|e| e == endpoint) {
            return Err(ToolError::Connect {
                endpoint: endpoint.to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(Box::new(FakeSession {
            shared: Arc::clone(&self.shared),
        }))
    }
}

#[async_trait]
impl ToolSession for FakeSession {
    async fn call(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<RawToolResult, ToolError> {
        let arguments = Value::Object(arguments);
        lock(&self.shared.calls).push((tool.to_string(), arguments.clone()));
        let payload = match tool {
            TOOL_DISCOVER => json!({"datasets": ["PLFS", "CPI", "WPI", "IIP", "ASI", "NAS", "ENERGY"]}),
            TOOL_INDICATORS => json!({"indicators": [{"code": "1", "name": "General index"}]}),
            TOOL_METADATA => self.shared.metadata.clone(),
            TOOL_DATA => (self.shared.data)(arguments.get("filters").unwrap_or(&Value::Null)),
            other => {
                return Err(ToolError::ToolFailed {
                    tool: other.to_string(),
                    message: "unknown tool".to_string(),
                });
            }
        };
        Ok(RawToolResult {
            structured: None,
            data: Some(payload),
            raw: json!({"content": []}),
        })
    }

    async fn close(self: Box<Self>) {}
}

/// Scripted collaborators recording what they were asked.
pub struct FakeCollaborators {
    pub classification: Option<Classification>,
    pub claim_type: ClaimType,
    /// The n-th filter selection returns entry `min(n, len - 1)`.
    pub selections: Vec<FilterSelection>,
    pub chart: Vec<ChartPoint>,
    pub fail_selector: bool,
    pub hints: Mutex<Vec<Option<String>>>,
    pub interpreted: Mutex<Vec<Value>>,
    pub overviews: Mutex<Vec<bool>>,
}

impl FakeCollaborators {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            classification: Some(Classification {
                is_answerable: true,
                reasoning: None,
                datasets: vec![DatasetSelection {
                    dataset,
                    indicator_hint: Some("general index".to_string()),
                }],
            }),
            claim_type: ClaimType::Trend,
            selections: vec![FilterSelection {
                filters: filters(&[("year", "2021,2022,2023")]),
                ..FilterSelection::default()
            }],
            chart: Vec::new(),
            fail_selector: false,
            hints: Mutex::new(Vec::new()),
            interpreted: Mutex::new(Vec::new()),
            overviews: Mutex::new(Vec::new()),
        }
    }

    pub fn out_of_scope() -> Self {
        Self {
            classification: Some(Classification::default()),
            ..Self::new(Dataset::Cpi)
        }
    }

    pub fn hints(&self) -> Vec<Option<String>> {
        lock(&self.hints).clone()
    }

    pub fn interpreted(&self) -> Vec<Value> {
        lock(&self.interpreted).clone()
    }

    pub fn overviews(&self) -> Vec<bool> {
        lock(&self.overviews).clone()
    }
}

fn api_failure() -> AgentError {
    AgentError::ApiRequest {
        message: "model unavailable".to_string(),
        status: Some(503),
    }
}

#[async_trait]
impl Collaborators for FakeCollaborators {
    async fn classify(
        &self,
        _claim: &str,
        overview: Option<&Value>,
    ) -> Result<Classification, AgentError> {
        lock(&self.overviews).push(overview.is_some());
        self.classification.clone().ok_or_else(api_failure)
    }

    async fn select_indicator(
        &self,
        _claim: &str,
        _dataset: Dataset,
        _indicators: &Value,
    ) -> Result<IndicatorSelection, AgentError> {
        Ok(IndicatorSelection {
            params: filters(&[("base_year", "2012")]),
            claim_type: self.claim_type,
        })
    }

    async fn select_filters(
        &self,
        request: FilterRequest<'_>,
    ) -> Result<FilterSelection, AgentError> {
        if self.fail_selector {
            return Err(api_failure());
        }
        let mut hints = lock(&self.hints);
        hints.push(request.pagination_hint.map(str::to_string));
        let idx = (hints.len() - 1).min(self.selections.len().saturating_sub(1));
        Ok(self.selections.get(idx).cloned().unwrap_or_default())
    }

    async fn interpret(
        &self,
        request: InterpretRequest<'_>,
    ) -> Result<Interpretation, AgentError> {
        lock(&self.interpreted).push(json!({
            "indicator": request.indicator,
            "filters": request.filters,
            "data": request.data,
            "source_hint": request.source_hint,
        }));
        Ok(Interpretation {
            verdict: Verdict::Confirmed,
            headline_stat: "5.4% in 2023".to_string(),
            explanation: "Inflation eased after 2022.".to_string(),
            chart_data: self.chart.clone(),
            source: format!("{}, 2021-2023", request.source_hint),
        })
    }
}
