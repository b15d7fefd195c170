//! Benchmark controller
//!
//! Drives one run per request through `Idle -> Running -> Succeeded | Failed`,
//! and is the only place where failures turn into user-visible state. The
//! current [`ViewState`] is published on a watch channel so observers can
//! follow a run while it is outstanding.

use chrono::{DateTime, Utc};
use dbbench_common::{DbBenchConfig, EngineProfiles, TestKind};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::catalog::{CatalogEntry, TestCatalog};
use crate::extract::{extract, summarize, DataQualityIssue, ExtractError};
use crate::presenter::{ChartPresenter, PresentMode};
use crate::render::{ChartBackend, ChartKind};
use crate::series::{NormalizedSeries, RunSummary, SeriesEntry};
use crate::source::{ResultSource, TransportError};

pub const TRANSPORT_FAILURE_MESSAGE: &str = "Benchmark request failed – check backend logs.";
pub const SHAPE_FAILURE_MESSAGE: &str =
    "Benchmark response could not be read – unexpected result shape.";

/// Lifecycle phase of the most recent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("unreadable result: {0}")]
    Extraction(#[from] ExtractError),
}

impl RunError {
    /// Generic message shown instead of the detailed cause
    pub fn user_message(&self) -> &'static str {
        match self {
            RunError::Transport(_) => TRANSPORT_FAILURE_MESSAGE,
            RunError::Extraction(_) => SHAPE_FAILURE_MESSAGE,
        }
    }
}

/// Snapshot of everything a caller can observe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub phase: RunPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub summary: RunSummary,
    pub last_kind: Option<TestKind>,
    /// Data-quality issues of the last successful run
    pub warnings: Vec<DataQualityIssue>,
    /// Completed runs, successful or not
    pub runs: usize,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: RunPhase::Idle,
            loading: false,
            error: None,
            summary: RunSummary::unavailable(),
            last_kind: None,
            warnings: Vec::new(),
            runs: 0,
            finished_at: None,
        }
    }
}

struct RunOutcome {
    series: NormalizedSeries,
    summary: RunSummary,
    issues: Vec<DataQualityIssue>,
}

pub struct BenchmarkController<S: ResultSource, B: ChartBackend> {
    source: S,
    presenter: ChartPresenter<B>,
    engines: EngineProfiles,
    trend: bool,
    trend_runs: HashMap<TestKind, usize>,
    state: ViewState,
    state_tx: watch::Sender<ViewState>,
}

impl<S: ResultSource, B: ChartBackend> BenchmarkController<S, B> {
    pub fn new(source: S, backend: B, config: &DbBenchConfig) -> Self {
        let (state_tx, _) = watch::channel(ViewState::default());
        Self {
            source,
            presenter: ChartPresenter::new(backend, config.engines.clone()),
            engines: config.engines.clone(),
            trend: config.view.trend,
            trend_runs: HashMap::new(),
            state: ViewState::default(),
            state_tx,
        }
    }

    /// Grow one trend chart across runs instead of replacing it per run
    pub fn with_trend(mut self, trend: bool) -> Self {
        self.trend = trend;
        self
    }

    /// Run one benchmark to completion and return its final phase.
    ///
    /// Taking `&mut self` serializes runs on a controller.
    pub async fn run_benchmark(&mut self, kind: TestKind) -> RunPhase {
        let entry = TestCatalog::resolve(kind);
        let previous_summary = self.state.summary;

        info!("Running {} benchmark ({})", kind, entry.path);
        self.state.phase = RunPhase::Running;
        self.state.loading = true;
        self.state.error = None;
        self.state.warnings.clear();
        self.state.summary = RunSummary::unavailable();
        self.state.last_kind = Some(kind);
        self.publish();

        let started = Instant::now();
        match self.execute(entry).await {
            Ok(outcome) => {
                for issue in &outcome.issues {
                    warn!("{} result: {}", kind, issue);
                }
                self.present(entry, &outcome);
                info!(
                    "{} benchmark finished in {:?}: {} categories, {} issues",
                    kind,
                    started.elapsed(),
                    outcome.series.len(),
                    outcome.issues.len()
                );
                self.state.phase = RunPhase::Succeeded;
                self.state.summary = outcome.summary;
                self.state.warnings = outcome.issues;
            }
            Err(err) => {
                error!("{} benchmark failed after {:?}: {}", kind, started.elapsed(), err);
                self.state.phase = RunPhase::Failed;
                self.state.error = Some(err.user_message().to_string());
                self.state.summary = previous_summary;
            }
        }

        self.state.loading = false;
        self.state.runs += 1;
        self.state.finished_at = Some(Utc::now());
        self.publish();
        self.state.phase
    }

    async fn execute(&self, entry: &CatalogEntry) -> Result<RunOutcome, RunError> {
        let raw = entry.invoke(&self.source).await?;
        let extraction = extract(&entry.shape, &raw)?;
        let summary = summarize(&entry.shape, &raw, &extraction.series, &self.engines);
        Ok(RunOutcome {
            series: extraction.series,
            summary,
            issues: extraction.issues,
        })
    }

    fn present(&mut self, entry: &CatalogEntry, outcome: &RunOutcome) {
        if self.trend {
            let run = self.trend_runs.entry(entry.kind).or_insert(0);
            *run += 1;
            let point: NormalizedSeries = std::iter::once(SeriesEntry::new(
                format!("{} #{}", entry.label, run),
                outcome.summary.as_values(),
            ))
            .collect();
            self.presenter.present(&point, ChartKind::Line, PresentMode::Append);
        } else {
            self.presenter.present(&outcome.series, entry.chart, entry.mode);
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }

    pub fn current_summary(&self) -> RunSummary {
        self.state.summary
    }

    pub fn current_error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state_tx.subscribe()
    }

    pub fn presenter(&self) -> &ChartPresenter<B> {
        &self.presenter
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
