//! Configuration management for dbbench

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DbBenchError, Result};
use crate::types::{Engine, EngineProfile};

/// Remote benchmark endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL the per-kind paths are appended to
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/benchmarks".to_string(),
            // benchmark runs against 10k-row datasets take a while
            timeout_ms: 120_000,
        }
    }
}

/// The two compared engines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProfiles {
    pub engine_a: EngineProfile,
    pub engine_b: EngineProfile,
}

impl Default for EngineProfiles {
    fn default() -> Self {
        Self {
            engine_a: EngineProfile::postgres(),
            engine_b: EngineProfile::mongo(),
        }
    }
}

impl EngineProfiles {
    pub fn get(&self, engine: Engine) -> &EngineProfile {
        match engine {
            Engine::A => &self.engine_a,
            Engine::B => &self.engine_b,
        }
    }
}

/// Chart view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Grow one trend chart across runs instead of rebuilding per run
    pub trend: bool,
    /// Directory chart documents and view state are written to
    pub output_dir: PathBuf,
    /// Chart document title
    pub title: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            trend: false,
            output_dir: PathBuf::from("./benchmark-results"),
            title: "Postgres vs MongoDB Benchmarks".to_string(),
        }
    }
}

/// Top-level dbbench configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DbBenchConfig {
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
    pub endpoint: EndpointConfig,
    pub engines: EngineProfiles,
    pub view: ViewConfig,
}

/// Configuration source for loading dbbench settings
pub enum ConfigSource {
    File(PathBuf),
    Default,
    Environment,
}

impl DbBenchConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DbBenchError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load and validate configuration from the given source.
    ///
    /// File and default sources are still subject to environment overrides,
    /// so a deployment can point an existing config at another backend.
    pub fn load(source: ConfigSource) -> Result<Self> {
        let mut config = match source {
            ConfigSource::File(path) => Self::from_file(path)?,
            ConfigSource::Default | ConfigSource::Environment => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override settings from `DBBENCH_*` variables resolved through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DBBENCH_BASE_URL") {
            debug!("base_url overridden from environment");
            self.endpoint.base_url = url;
        }

        if let Some(timeout) = lookup("DBBENCH_TIMEOUT_MS") {
            self.endpoint.timeout_ms = timeout.parse().unwrap_or(self.endpoint.timeout_ms);
        }

        if let Some(trend) = lookup("DBBENCH_TREND") {
            self.view.trend = trend.parse().unwrap_or(self.view.trend);
        }

        if let Some(dir) = lookup("DBBENCH_OUTPUT_DIR") {
            self.view.output_dir = PathBuf::from(dir);
        }

        if let Some(level) = lookup("DBBENCH_LOG") {
            self.log_level = level;
        }
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.base_url.trim().is_empty() {
            return Err(DbBenchError::Config("endpoint.base_url must not be empty".to_string()));
        }

        if self.endpoint.timeout_ms == 0 {
            return Err(DbBenchError::Config("endpoint.timeout_ms must be positive".to_string()));
        }

        for profile in [&self.engines.engine_a, &self.engines.engine_b] {
            if profile.prefix.trim().is_empty() {
                return Err(DbBenchError::Config("engine prefixes must not be empty".to_string()));
            }
            // matched verbatim against payload field names
            if profile.prefix.trim() != profile.prefix {
                return Err(DbBenchError::Config(format!(
                    "engine prefix '{}' has surrounding whitespace",
                    profile.prefix
                )));
            }
        }

        let a = self.engines.engine_a.prefix.to_lowercase();
        let b = self.engines.engine_b.prefix.to_lowercase();
        if a == b {
            return Err(DbBenchError::Config(format!(
                "engine prefixes must differ, both are '{}'",
                a
            )));
        }

        Ok(())
    }

    /// Effective log filter
    pub fn log_filter(&self) -> &str {
        if self.log_level.is_empty() {
            "info"
        } else {
            &self.log_level
        }
    }
}
