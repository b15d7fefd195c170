use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dbbench_common::DbBenchConfig;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "dbbench.toml")]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show the effective configuration (file, defaults and environment)
    Show,
}

pub fn handle_command(action: ConfigCommands, config: &DbBenchConfig) -> Result<()> {
    match action {
        ConfigCommands::Init { output, force } => init(&output, force),
        ConfigCommands::Show => show(config),
    }
}

pub fn init(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }

    DbBenchConfig::default()
        .to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Default configuration written to {}", output.display());
    Ok(())
}

fn show(config: &DbBenchConfig) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbbench.toml");

        init(&path, false).unwrap();
        let loaded = DbBenchConfig::from_file(&path).unwrap();
        assert_eq!(loaded.endpoint.base_url, DbBenchConfig::default().endpoint.base_url);
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dbbench.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
        assert_eq!(DbBenchConfig::from_file(&path).unwrap().log_level, "");
    }
}
