use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dbbench_common::{ConfigSource, DbBenchConfig};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

mod benchmark;
mod config;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "dbbench.toml";

#[derive(Parser)]
#[command(name = "dbbench")]
#[command(about = "Postgres vs MongoDB benchmark runner and chart renderer")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DBBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Force debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmarks and render their results
    Run(benchmark::RunArgs),
    /// List the available test kinds
    List,
    /// Extract a saved result payload offline
    Extract(benchmark::ExtractArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: config::ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // `config init` must work even when the existing file is broken
    if let Commands::Config {
        action: config::ConfigCommands::Init { output, force },
    } = &cli.command
    {
        init_logging(cli.debug, "info");
        return config::init(output, *force);
    }

    let loaded = load_config(cli.config.as_deref());
    let level = loaded.as_ref().map(|c| c.log_filter().to_string()).unwrap_or_else(|_| "info".to_string());
    init_logging(cli.debug, &level);
    let config = loaded?;

    match cli.command {
        Commands::Run(args) => benchmark::run(args, config).await,
        Commands::List => benchmark::list(),
        Commands::Extract(args) => benchmark::extract(args, &config),
        Commands::Config { action } => config::handle_command(action, &config),
    }
}

fn load_config(path: Option<&Path>) -> dbbench_common::Result<DbBenchConfig> {
    let source = match path {
        Some(path) => ConfigSource::File(path.to_path_buf()),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => ConfigSource::File(PathBuf::from(DEFAULT_CONFIG_FILE)),
        None => ConfigSource::Default,
    };
    DbBenchConfig::load(source)
}

/// RUST_LOG wins over the configured level; `--debug` wins over both
fn init_logging(debug: bool, level: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
