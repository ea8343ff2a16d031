//! End-to-end claim checks against in-memory fakes.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use claimcheck::core::{ClaimType, Dataset, FilterSelection};
use claimcheck::mcp::TOOL_DATA;
use claimcheck::pipeline::{ClaimChecker, ClaimOutcome, DiscoveryCache, PAGINATION_HINT};

use common::{
    BASE_URL, FakeCollaborators, FakeGateway, checker, cpi_rows, default_metadata, fast_config,
    filters,
};

fn success(outcome: ClaimOutcome) -> claimcheck::pipeline::VerdictReport {
    match outcome {
        ClaimOutcome::Success(report) => report,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn cpi_claim_runs_all_four_steps() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let checker = checker(&gateway, &collaborators, fast_config());

    let report = success(checker.check("Retail inflation fell to 5.4% in 2023").await);

    let ids: Vec<u8> = report.mcp_steps.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    let names: Vec<&str> = report
        .mcp_steps
        .records()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["Discover", "Indicators", "Filters", "Fetch"]);
    assert_eq!(report.mcp_steps.records()[3].result, "Data fetched");

    // One chart point per distinct year, first value wins.
    let years: Vec<&str> = report.chart_data.iter().map(|p| p.year.as_str()).collect();
    assert_eq!(years, vec!["2021", "2022", "2023"]);
    assert!((report.chart_data[2].value - 5.4).abs() < f64::EPSILON);
    assert_eq!(report.source, "CPI (MoSPI), 2021-2023");

    let indicator_calls = gateway.calls("2_get_indicators");
    assert_eq!(
        indicator_calls,
        vec![json!({"dataset": "CPI", "user_query": "general index"})]
    );
    let metadata_calls = gateway.calls("3_get_metadata");
    assert_eq!(
        metadata_calls,
        vec![json!({"dataset": "CPI", "base_year": "2012"})]
    );
    let data_calls = gateway.calls(TOOL_DATA);
    assert_eq!(
        data_calls,
        vec![json!({"dataset": "CPI", "filters": {"year": "2021,2022,2023"}})]
    );
}

#[tokio::test]
async fn second_request_uses_cached_overview() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let checker = checker(&gateway, &collaborators, fast_config());

    let first = success(checker.check("CPI rose").await);
    assert_eq!(first.mcp_steps.records()[0].result, "Dataset overview retrieved");

    let second = success(checker.check("CPI rose again").await);
    let discover = &second.mcp_steps.records()[0];
    assert_eq!(discover.description, "Used cached dataset overview");
    assert_eq!(discover.result, "Dataset overview cached");
    assert_eq!(discover.time, "0.00s");

    assert_eq!(gateway.calls("1_know_about_mospi_api").len(), 1);
    // The classifier sees the overview once it is cached.
    assert_eq!(collaborators.overviews(), vec![false, true]);
}

#[tokio::test]
async fn shared_cache_spans_checkers() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let cache = Arc::new(DiscoveryCache::new());
    let make = || {
        ClaimChecker::new(
            gateway.clone(),
            collaborators.clone(),
            Arc::clone(&cache),
            fast_config(),
        )
    };

    success(make().check("a").await);
    let report = success(make().check("b").await);
    assert_eq!(report.mcp_steps.records()[0].time, "0.00s");
    assert_eq!(gateway.calls("1_know_about_mospi_api").len(), 1);
}

#[tokio::test]
async fn unanswerable_claim_is_out_of_scope() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators::out_of_scope());
    let checker = checker(&gateway, &collaborators, fast_config());

    let outcome = checker.check("Will it rain tomorrow?").await;
    let body = outcome.to_body();
    assert_eq!(body["verdict"], "out_of_scope");
    assert_eq!(body["outOfScope"], true);
    assert_eq!(body["mcpSteps"], json!([]));
    assert!(gateway.connects().is_empty());
}

#[tokio::test]
async fn classifier_outcomes_map_to_fixed_errors() {
    let gateway = Arc::new(FakeGateway::new());

    let failing = Arc::new(FakeCollaborators {
        classification: None,
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let outcome = checker(&gateway, &failing, fast_config()).check("x").await;
    assert_eq!(outcome, ClaimOutcome::ClassifierFailure);
    assert_eq!(
        outcome.to_body(),
        json!({"error": true, "message": "Classifier failed"})
    );

    let empty = Arc::new(FakeCollaborators {
        classification: Some(claimcheck::core::Classification {
            is_answerable: true,
            reasoning: None,
            datasets: vec![],
        }),
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let outcome = checker(&gateway, &empty, fast_config()).check("x").await;
    assert_eq!(outcome, ClaimOutcome::NoDatasetSelected);
    assert!(gateway.connects().is_empty());
}

#[tokio::test]
async fn comparison_claim_pairs_labelled_series() {
    let gateway = Arc::new(FakeGateway::build(
        Vec::new(),
        default_metadata(),
        Box::new(|filters: &Value| {
            let value = if filters["sector"] == "1" { 4.2 } else { 6.6 };
            json!({"data": [{"year": "2023", "value": value, "sector": filters["sector"]}]})
        }),
    ));
    let collaborators = Arc::new(FakeCollaborators {
        claim_type: ClaimType::Comparison,
        selections: vec![FilterSelection {
            filters: filters(&[("year", "2023"), ("sector", "Rural")]),
            benchmark_filters: Some(filters(&[("year", "2023"), ("sector", "Urban")])),
            optional_drop_filters: vec![],
        }],
        ..FakeCollaborators::new(Dataset::Plfs)
    });
    let checker = checker(&gateway, &collaborators, fast_config());

    let report = success(checker.check("Rural unemployment is lower than urban").await);

    let fetch_descriptions: Vec<&str> = report
        .mcp_steps
        .records()
        .iter()
        .filter(|r| r.id == 4)
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(
        fetch_descriptions,
        vec![
            "Fetched data for PLFS (primary, primary)",
            "Fetched data for PLFS (benchmark, primary)"
        ]
    );

    let interpreted = collaborators.interpreted();
    let data = &interpreted[0]["data"];
    assert_eq!(data["primary_label"], "sector=1");
    assert_eq!(data["benchmark_label"], "sector=2");
    assert_eq!(data["primary"], json!([{"period": "2023", "value": 4.2}]));
    assert_eq!(data["benchmark"], json!([{"period": "2023", "value": 6.6}]));
    assert_eq!(interpreted[0]["filters"], json!({"sector": "1", "year": "2023"}));
    assert_eq!(interpreted[0]["source_hint"], "PLFS (MoSPI)");
}

#[tokio::test]
async fn trend_claim_ignores_benchmark_filters() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators {
        selections: vec![FilterSelection {
            filters: filters(&[("year", "2023")]),
            benchmark_filters: Some(filters(&[("year", "2022")])),
            optional_drop_filters: vec![],
        }],
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let checker = checker(&gateway, &collaborators, fast_config());

    success(checker.check("CPI trend").await);
    assert_eq!(gateway.calls(TOOL_DATA).len(), 1);
    assert!(collaborators.interpreted()[0]["data"].is_array());
}

#[tokio::test]
async fn paginated_fetch_triggers_one_refinement() {
    let gateway = Arc::new(FakeGateway::build(
        Vec::new(),
        default_metadata(),
        Box::new(|filters: &Value| {
            if filters.get("group").is_some() {
                json!({"meta_data": {"totalPages": 4}, "data": [{"year": "2020", "value": 1.0}]})
            } else {
                json!({"meta_data": {"totalPages": 1}, "data": [{"year": "2023", "value": 2.0}]})
            }
        }),
    ));
    let collaborators = Arc::new(FakeCollaborators {
        selections: vec![
            FilterSelection {
                filters: filters(&[("year", "2023"), ("group", "food")]),
                ..FilterSelection::default()
            },
            FilterSelection {
                filters: filters(&[("year", "2023")]),
                ..FilterSelection::default()
            },
        ],
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let checker = checker(&gateway, &collaborators, fast_config());

    let report = success(checker.check("Food prices").await);

    assert_eq!(
        collaborators.hints(),
        vec![None, Some(PAGINATION_HINT.to_string())]
    );
    let labels: Vec<&str> = report
        .mcp_steps
        .records()
        .iter()
        .filter(|r| r.id == 4)
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "Fetched data for CPI (primary, primary)",
            "Fetched data for CPI (primary_retry, primary)"
        ]
    );
    // The refined series replaces the original.
    let years: Vec<&str> = report.chart_data.iter().map(|p| p.year.as_str()).collect();
    assert_eq!(years, vec!["2023"]);
}

#[tokio::test]
async fn empty_fetch_retries_without_optional_filters() {
    let gateway = Arc::new(FakeGateway::build(
        Vec::new(),
        default_metadata(),
        Box::new(|filters: &Value| {
            if filters.get("sector").is_some() {
                json!({"data": []})
            } else {
                cpi_rows()
            }
        }),
    ));
    let collaborators = Arc::new(FakeCollaborators {
        selections: vec![FilterSelection {
            filters: filters(&[("year", "2023"), ("sector", "Urban")]),
            benchmark_filters: None,
            optional_drop_filters: vec!["sector".to_string(), "year".to_string()],
        }],
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let checker = checker(&gateway, &collaborators, fast_config());

    let report = success(checker.check("Urban prices").await);
    let data_calls = gateway.calls(TOOL_DATA);
    assert_eq!(data_calls.len(), 2);
    assert_eq!(data_calls[0]["filters"], json!({"sector": "2", "year": "2023"}));
    // `year` is required and stays.
    assert_eq!(data_calls[1]["filters"], json!({"year": "2023"}));
    assert!(!report.chart_data.is_empty());
}

#[tokio::test]
async fn falls_back_to_mcp_suffix_endpoint() {
    let gateway = Arc::new(FakeGateway::build(
        vec![BASE_URL.to_string()],
        default_metadata(),
        Box::new(|_| cpi_rows()),
    ));
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let checker = checker(&gateway, &collaborators, fast_config());

    let report = success(checker.check("CPI rose").await);
    let mcp_endpoint = format!("{BASE_URL}/mcp");
    assert_eq!(
        gateway.connects(),
        vec![
            BASE_URL.to_string(),
            BASE_URL.to_string(),
            BASE_URL.to_string(),
            mcp_endpoint
        ]
    );
    // Failed attempts leave nothing in the trace.
    assert_eq!(report.mcp_steps.len(), 4);
}

#[tokio::test]
async fn exhausted_upstream_reports_unavailable() {
    let mcp_endpoint = format!("{BASE_URL}/mcp");
    let gateway = Arc::new(FakeGateway::build(
        vec![BASE_URL.to_string(), mcp_endpoint],
        default_metadata(),
        Box::new(|_| cpi_rows()),
    ));
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let checker = checker(&gateway, &collaborators, fast_config());

    let outcome = checker.check("CPI rose").await;
    assert_eq!(outcome, ClaimOutcome::UpstreamUnavailable);
    assert_eq!(
        outcome.to_body(),
        json!({"error": true, "message": "MCP server not responding"})
    );
    assert_eq!(gateway.connects().len(), 6);
}

#[tokio::test]
async fn selector_failure_retries_the_attempt() {
    let gateway = Arc::new(FakeGateway::new());
    let collaborators = Arc::new(FakeCollaborators {
        fail_selector: true,
        ..FakeCollaborators::new(Dataset::Cpi)
    });
    let checker = checker(&gateway, &collaborators, fast_config());

    assert_eq!(
        checker.check("CPI rose").await,
        ClaimOutcome::UpstreamUnavailable
    );
    assert_eq!(gateway.connects().len(), 6);
    // Discover ran once; every later attempt hit the cache.
    assert_eq!(gateway.calls("1_know_about_mospi_api").len(), 1);
}

#[tokio::test]
async fn request_deadline_bounds_the_retry_loop() {
    let gateway = Arc::new(FakeGateway::build(
        vec![BASE_URL.to_string()],
        default_metadata(),
        Box::new(|_| cpi_rows()),
    ));
    let collaborators = Arc::new(FakeCollaborators::new(Dataset::Cpi));
    let config = claimcheck::pipeline::PipelineConfig::builder()
        .mcp_url(BASE_URL)
        .retry_delays(vec![Duration::ZERO, Duration::from_secs(30)])
        .request_deadline(Duration::from_millis(200))
        .build()
        .unwrap_or_else(|_| unreachable!());
    let checker = checker(&gateway, &collaborators, config);

    let start = Instant::now();
    let outcome = checker.check("CPI rose").await;
    assert_eq!(outcome, ClaimOutcome::UpstreamUnavailable);
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(gateway.connects().len(), 1);
}
