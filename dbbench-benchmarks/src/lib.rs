//! dbbench result normalization and chart-state engine
//!
//! This crate turns raw Postgres vs MongoDB benchmark payloads into charts.
//! It includes:
//! - The test catalog mapping each test kind to its endpoint and payload shape
//! - Extraction of comparable per-engine series from four payload shapes
//! - A chart presenter with replace and append (trend) modes
//! - A controller driving runs and publishing their observable state

pub mod catalog;
pub mod controller;
pub mod extract;
pub mod presenter;
pub mod render;
pub mod series;
pub mod source;

pub use catalog::{CatalogEntry, ShapeFamily, TestCatalog};
pub use controller::{BenchmarkController, RunError, RunPhase, ViewState};
pub use extract::{extract, summarize, DataQualityIssue, ExtractError, Extraction};
pub use presenter::{ChartPresenter, PresentMode};
pub use render::{ChartBackend, ChartKind, ChartSpec, Dataset, HtmlBackend, LiveChart, MemoryBackend, RenderLog};
pub use series::{EngineValues, NormalizedSeries, RunSummary, SeriesEntry};
pub use source::{FileSource, HttpSource, RawResult, ResultSource, TransportError};
