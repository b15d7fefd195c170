use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use dbbench_benchmarks::{
    extract as extract_series, summarize, BenchmarkController, ChartBackend, FileSource, HtmlBackend,
    HttpSource, MemoryBackend, NormalizedSeries, RawResult, ResultSource, RunPhase, RunSummary,
    TestCatalog, ViewState,
};
use dbbench_common::{DbBenchConfig, Engine, EngineProfiles, TestKind};
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_FILE: &str = "benchmark_chart.html";
const VIEW_STATE_FILE: &str = "view_state.json";

#[derive(Args)]
pub struct RunArgs {
    /// Test kinds to run, in order (writes, reads, updates, deletes, indexComparison, aggregation)
    #[arg(required = true)]
    pub kinds: Vec<TestKind>,
    /// Grow one trend chart across the runs
    #[arg(long)]
    pub trend: bool,
    /// Do not write a chart document
    #[arg(long)]
    pub headless: bool,
    /// Replay saved payloads from DIR instead of calling the backend
    #[arg(long, value_name = "DIR")]
    pub replay: Option<PathBuf>,
    /// Benchmark backend base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
    /// Output directory for the chart and view state
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Test kind the payload belongs to
    #[arg(short, long)]
    pub kind: TestKind,
    /// Saved payload (JSON)
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub async fn run(args: RunArgs, mut config: DbBenchConfig) -> Result<()> {
    if let Some(url) = args.base_url {
        config.endpoint.base_url = url;
    }
    if let Some(dir) = args.output {
        config.view.output_dir = dir;
    }
    config.view.trend |= args.trend;
    config.validate()?;

    let source: Box<dyn ResultSource> = match &args.replay {
        Some(dir) => {
            info!("Replaying saved results from {}", dir.display());
            Box::new(FileSource::new(dir))
        }
        None => {
            info!("Using benchmark backend at {}", config.endpoint.base_url);
            Box::new(HttpSource::from_config(&config.endpoint).context("Failed to create HTTP client")?)
        }
    };

    let output_dir = config.view.output_dir.clone();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let failed = if args.headless {
        let mut controller = BenchmarkController::new(source, MemoryBackend::new(), &config);
        let failed = run_kinds(&mut controller, &args.kinds, &config.engines).await;
        write_view_state(controller.state(), &output_dir)?;
        failed
    } else {
        let mut controller = BenchmarkController::new(source, HtmlBackend::new(config.view.title.clone()), &config);
        let failed = run_kinds(&mut controller, &args.kinds, &config.engines).await;
        if let Some(chart) = controller.presenter().chart() {
            let path = output_dir.join(CHART_FILE);
            chart
                .write_to(&path)
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
            info!("Chart document at revision {}", chart.revision());
            println!("Chart written to {}", path.display());
        }
        write_view_state(controller.state(), &output_dir)?;
        failed
    };

    if failed > 0 {
        bail!("{} of {} benchmark runs failed", failed, args.kinds.len());
    }
    Ok(())
}

/// Run every kind in order and return how many runs failed
async fn run_kinds<S, B>(
    controller: &mut BenchmarkController<S, B>,
    kinds: &[TestKind],
    engines: &EngineProfiles,
) -> usize
where
    S: ResultSource,
    B: ChartBackend,
{
    let mut failed = 0;
    for &kind in kinds {
        match controller.run_benchmark(kind).await {
            RunPhase::Succeeded => {
                let warnings = controller.state().warnings.len();
                let note = if warnings > 0 {
                    format!("  [{} warnings]", warnings).yellow().to_string()
                } else {
                    String::new()
                };
                println!(
                    "  {} {:<16} {}{}",
                    "✓".green(),
                    kind.to_string(),
                    format_summary(&controller.current_summary(), engines),
                    note
                );
            }
            _ => {
                failed += 1;
                println!(
                    "  {} {:<16} {}",
                    "✗".red(),
                    kind.to_string(),
                    controller.current_error().unwrap_or_default().red()
                );
            }
        }
    }
    failed
}

fn write_view_state(state: &ViewState, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(VIEW_STATE_FILE);
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write view state to {}", path.display()))?;
    info!("View state written to {}", path.display());
    Ok(())
}

pub fn list() -> Result<()> {
    println!("Available test kinds:");
    println!(
        "  {:<16} {:<12} {:<20} {:<6} {}",
        "KIND", "ENDPOINT", "SHAPE", "CHART", "DESCRIPTION"
    );
    for entry in TestCatalog::entries() {
        println!(
            "  {:<16} {:<12} {:<20} {:<6} {}",
            entry.kind.to_string(),
            entry.path,
            entry.shape.name(),
            entry.chart.to_string(),
            entry.description
        );
    }
    Ok(())
}

pub fn extract(args: ExtractArgs, config: &DbBenchConfig) -> Result<()> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let raw: RawResult = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    let entry = TestCatalog::resolve(args.kind);
    let extraction = extract_series(&entry.shape, &raw)
        .with_context(|| format!("Cannot extract {} result", args.kind))?;
    let summary = summarize(&entry.shape, &raw, &extraction.series, &config.engines);

    match args.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "kind": args.kind,
                "shape": entry.shape.name(),
                "series": extraction.series,
                "summary": summary,
                "issues": extraction.issues,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            print_series(&extraction.series, &config.engines);
            println!("\nSummary: {}", format_summary(&summary, &config.engines));
            if !extraction.is_clean() {
                println!("\n{}", "Data quality issues:".yellow());
                for issue in &extraction.issues {
                    println!("  - {}", issue);
                }
            }
        }
    }
    Ok(())
}

fn print_series(series: &NormalizedSeries, engines: &EngineProfiles) {
    let width = series.categories().map(str::len).max().unwrap_or(0).max(8);
    println!(
        "{:<width$}  {:>16}  {:>16}",
        "CATEGORY",
        engines.engine_a.label,
        engines.engine_b.label,
        width = width
    );
    for entry in series.entries() {
        println!(
            "{:<width$}  {:>16}  {:>16}",
            entry.category,
            format_time(entry.values.get(Engine::A)),
            format_time(entry.values.get(Engine::B)),
            width = width
        );
    }
}

fn format_summary(summary: &RunSummary, engines: &EngineProfiles) -> String {
    format!(
        "{}: {}  {}: {}",
        engines.engine_a.label,
        format_time(summary.get(Engine::A)),
        engines.engine_b.label,
        format_time(summary.get(Engine::B))
    )
}

fn format_time(value: Option<f64>) -> String {
    match value {
        Some(ms) => format!("{:.2}", ms),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_time_marks_absent() {
        assert_eq!(format_time(Some(12.0)), "12.00");
        assert_eq!(format_time(None), "n/a");
    }

    #[tokio::test]
    async fn test_replayed_run_writes_chart_and_state() {
        let replay = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(replay.path().join("updates.json"), r#"{"postgresTimeMs": 14, "mongoTimeMs": 9}"#).unwrap();

        let args = RunArgs {
            kinds: vec![TestKind::Updates],
            trend: false,
            headless: false,
            replay: Some(replay.path().to_path_buf()),
            base_url: None,
            output: Some(output.path().to_path_buf()),
        };
        run(args, DbBenchConfig::default()).await.unwrap();

        let html = std::fs::read_to_string(output.path().join(CHART_FILE)).unwrap();
        assert!(html.contains(r#""categories":["Update"]"#));
        let state: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output.path().join(VIEW_STATE_FILE)).unwrap()).unwrap();
        assert_eq!(state["phase"], "succeeded");
        assert_eq!(state["summary"]["last_engine_a_time"], 14.0);
    }

    #[tokio::test]
    async fn test_failed_run_is_an_error_but_state_is_written() {
        let replay = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let args = RunArgs {
            kinds: vec![TestKind::Writes],
            trend: false,
            headless: true,
            replay: Some(replay.path().to_path_buf()),
            base_url: None,
            output: Some(output.path().to_path_buf()),
        };
        assert!(run(args, DbBenchConfig::default()).await.is_err());
        assert!(output.path().join(VIEW_STATE_FILE).exists());
        assert!(!output.path().join(CHART_FILE).exists());
    }
}
