use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DbBenchError;

/// Default engine profiles (compatible with the reference benchmark backend)
pub const ENGINE_A_PREFIX: &str = "postgres";
pub const ENGINE_B_PREFIX: &str = "mongo";
pub const ENGINE_A_COLOR: &str = "rgba(0, 180, 255, 0.9)";
pub const ENGINE_B_COLOR: &str = "rgba(255, 80, 160, 0.9)";

/// One of the two compared backing stores.
///
/// Engine values are symmetric but independently nullable; everything that
/// carries a per-engine value indexes it through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Engine {
    A,
    B,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::A, Engine::B];

    /// Position of this engine's dataset in a chart
    pub fn index(self) -> usize {
        match self {
            Engine::A => 0,
            Engine::B => 1,
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::A => write!(f, "engine_a"),
            Engine::B => write!(f, "engine_b"),
        }
    }
}

/// Presentation and matching properties of one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineProfile {
    /// Dataset label shown in charts and tables
    pub label: String,
    /// Case-insensitive field-name prefix used for generic averaging
    pub prefix: String,
    /// Fixed dataset color, kept stable across runs
    pub color: String,
}

impl EngineProfile {
    pub fn new(label: impl Into<String>, prefix: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prefix: prefix.into(),
            color: color.into(),
        }
    }

    pub fn postgres() -> Self {
        Self::new("Postgres (ms)", ENGINE_A_PREFIX, ENGINE_A_COLOR)
    }

    pub fn mongo() -> Self {
        Self::new("MongoDB (ms)", ENGINE_B_PREFIX, ENGINE_B_COLOR)
    }

    /// Whether a payload field name belongs to this engine
    pub fn matches(&self, field: &str) -> bool {
        field.to_lowercase().starts_with(&self.prefix.to_lowercase())
    }
}

/// Identifier selecting which workload/comparison is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestKind {
    Writes,
    Reads,
    Updates,
    Deletes,
    IndexComparison,
    Aggregation,
}

impl TestKind {
    pub const ALL: [TestKind; 6] = [
        TestKind::Writes,
        TestKind::Reads,
        TestKind::Updates,
        TestKind::Deletes,
        TestKind::IndexComparison,
        TestKind::Aggregation,
    ];

    /// Wire identifier of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            TestKind::Writes => "writes",
            TestKind::Reads => "reads",
            TestKind::Updates => "updates",
            TestKind::Deletes => "deletes",
            TestKind::IndexComparison => "indexComparison",
            TestKind::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = DbBenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "writes" => Ok(TestKind::Writes),
            "reads" => Ok(TestKind::Reads),
            "updates" => Ok(TestKind::Updates),
            "deletes" => Ok(TestKind::Deletes),
            "indexcomparison" | "index-comparison" | "mongo-index" => Ok(TestKind::IndexComparison),
            "aggregation" => Ok(TestKind::Aggregation),
            _ => Err(DbBenchError::UnknownTestKind(s.to_string())),
        }
    }
}
