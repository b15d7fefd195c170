//! End-to-end tests for dbbench
//!
//! These drive the controller through a source, extraction and a chart
//! backend exactly as the CLI does, covering repeated runs of mixed kinds,
//! failure handling and the trend view.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dbbench::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

/// Backend stand-in answering each endpoint with a fixed payload
struct FakeBackend {
    payloads: HashMap<&'static str, RawResult>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn healthy() -> Self {
        let payloads = [
            (
                "writes",
                json!({
                    "1000": {"postgresTimeMs": 12, "mongoTimeMs": 8},
                    "10000": {"postgresTimeMs": 95, "mongoTimeMs": 41},
                    "100000": {"postgresTimeMs": 910, "mongoTimeMs": 388}
                }),
            ),
            (
                "reads",
                json!({
                    "postgresFindAllTimeMs": 120, "mongoFindAllTimeMs": 80,
                    "postgresWithFilterTimeMs": 40, "mongoWithFilterTimeMs": 30,
                    "postgresWithFilterAndProjectionTimeMs": 35, "mongoWithFilterAndProjectionTimeMs": 22,
                    "postgresWithFilterAndProjectionAndSortTimeMs": 45, "mongoWithFilterAndProjectionAndSortTimeMs": 28
                }),
            ),
            ("updates", json!({"postgresTimeMs": 14, "mongoTimeMs": 9})),
            ("deletes", json!({"postgresTimeMs": 6, "mongoTimeMs": 4})),
            ("aggregation", json!({"postgresTimeMs": 33, "mongoTimeMs": 21})),
            ("mongo-index", json!({"mongoWithoutIndexTimeMs": 12, "mongoWithIndexTimeMs": 7})),
        ]
        .into_iter()
        .collect();

        Self {
            payloads,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn without(mut self, path: &str) -> Self {
        self.payloads.remove(path);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSource for FakeBackend {
    async fn fetch(&self, path: &str) -> Result<RawResult, TransportError> {
        self.calls.lock().unwrap().push(path.to_string());
        self.payloads.get(path).cloned().ok_or(TransportError::Status {
            status: 500,
            path: path.to_string(),
        })
    }
}

fn controller(source: FakeBackend, trend: bool) -> (BenchmarkController<FakeBackend, MemoryBackend>, RenderLog) {
    let backend = MemoryBackend::new();
    let log = backend.log();
    let mut config = DbBenchConfig::default();
    config.view.trend = trend;
    (BenchmarkController::new(source, backend, &config), log)
}

#[tokio::test]
async fn test_every_kind_end_to_end() -> Result<()> {
    let expected_categories = [
        (TestKind::Writes, 3),
        (TestKind::Reads, 4),
        (TestKind::Updates, 1),
        (TestKind::Deletes, 1),
        (TestKind::IndexComparison, 2),
        (TestKind::Aggregation, 1),
    ];
    let (mut controller, log) = controller(FakeBackend::healthy(), false);

    for (kind, categories) in expected_categories {
        let phase = controller.run_benchmark(kind).await;
        if phase != RunPhase::Succeeded {
            return Err(anyhow!("{} ended in {:?}", kind, phase));
        }
        let chart = controller.presenter().chart().ok_or_else(|| anyhow!("no chart after {}", kind))?;
        assert_eq!(chart.spec().len(), categories, "{}", kind);
        assert_eq!(chart.spec().kind, TestCatalog::resolve(kind).chart);
        // replace mode never leaves more than one live instance
        assert_eq!(log.live(), 1);
    }

    assert_eq!(
        controller.source().calls(),
        vec!["writes", "reads", "updates", "deletes", "mongo-index", "aggregation"]
    );
    assert_eq!(log.renders(), 6);
    assert_eq!(log.disposes(), 5);
    Ok(())
}

#[tokio::test]
async fn test_index_comparison_leaves_postgres_absent() -> Result<()> {
    let (mut controller, _log) = controller(FakeBackend::healthy(), false);
    controller.run_benchmark(TestKind::IndexComparison).await;

    let spec = controller.presenter().chart().ok_or_else(|| anyhow!("no chart"))?.spec();
    assert_eq!(spec.categories, vec!["Without index", "With index"]);
    assert_eq!(spec.dataset(Engine::A).values, vec![None, None]);
    assert_eq!(spec.dataset(Engine::B).values, vec![Some(12.0), Some(7.0)]);
    assert_eq!(controller.current_summary(), RunSummary::new(None, Some(9.5)));
    Ok(())
}

#[tokio::test]
async fn test_writes_keep_payload_order() -> Result<()> {
    let (mut controller, _log) = controller(FakeBackend::healthy(), false);
    controller.run_benchmark(TestKind::Writes).await;

    let spec = controller.presenter().chart().ok_or_else(|| anyhow!("no chart"))?.spec();
    assert_eq!(spec.categories, vec!["1000", "10000", "100000"]);
    assert_eq!(spec.kind, ChartKind::Bar);
    Ok(())
}

#[tokio::test]
async fn test_failure_after_success_preserves_view() -> Result<()> {
    let (mut controller, log) = controller(FakeBackend::healthy().without("deletes"), false);

    controller.run_benchmark(TestKind::Reads).await;
    let before = controller.presenter().chart().map(|c| c.spec().clone());
    let summary = controller.current_summary();

    assert_eq!(controller.run_benchmark(TestKind::Deletes).await, RunPhase::Failed);
    assert_eq!(controller.current_error(), Some("Benchmark request failed – check backend logs."));
    assert_eq!(controller.current_summary(), summary);
    assert_eq!(controller.presenter().chart().map(|c| c.spec().clone()), before);
    assert_eq!(log.disposes(), 0);
    Ok(())
}

#[tokio::test]
async fn test_trend_view_across_mixed_kinds() -> Result<()> {
    let (mut controller, log) = controller(FakeBackend::healthy(), true);

    for kind in [TestKind::Updates, TestKind::Deletes, TestKind::Updates] {
        controller.run_benchmark(kind).await;
    }

    let spec = controller.presenter().chart().ok_or_else(|| anyhow!("no chart"))?.spec();
    assert_eq!(spec.kind, ChartKind::Line);
    assert_eq!(spec.categories, vec!["UPDATES #1", "DELETES #1", "UPDATES #2"]);
    assert_eq!(spec.dataset(Engine::A).values, vec![Some(14.0), Some(6.0), Some(14.0)]);
    assert_eq!(log.renders(), 1);
    assert_eq!(log.disposes(), 0);
    Ok(())
}

#[tokio::test]
async fn test_replay_from_saved_payloads() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(
        dir.path().join("aggregation.json"),
        r#"{"postgresTimeMs": 33.5, "mongoTimeMs": 21}"#,
    )?;

    let mut controller = BenchmarkController::new(
        FileSource::new(dir.path()),
        HtmlBackend::default(),
        &DbBenchConfig::default(),
    );

    assert_eq!(controller.run_benchmark(TestKind::Aggregation).await, RunPhase::Succeeded);
    assert_eq!(controller.current_summary(), RunSummary::new(Some(33.5), Some(21.0)));

    let html = controller
        .presenter()
        .chart()
        .ok_or_else(|| anyhow!("no chart"))?
        .to_html()
        .to_string();
    assert!(html.contains(r#""categories":["Aggregate"]"#));

    // nothing saved for reads
    assert_eq!(controller.run_benchmark(TestKind::Reads).await, RunPhase::Failed);
    Ok(())
}

#[tokio::test]
async fn test_view_state_snapshot_serializes() -> Result<()> {
    let (mut controller, _log) = controller(FakeBackend::healthy(), false);
    let rx = controller.subscribe();
    controller.run_benchmark(TestKind::Updates).await;

    let state = rx.borrow().clone();
    assert_eq!(state.runs, 1);
    let value = serde_json::to_value(&state)?;
    assert_eq!(value["phase"], "succeeded");
    assert_eq!(value["last_kind"], "updates");
    assert_eq!(value["loading"], false);
    assert!(value["error"].is_null());
    Ok(())
}
