//! dbbench - Postgres vs MongoDB benchmark result presentation
//!
//! This is the main crate that ties the workspace together: shared types and
//! configuration from `dbbench-common`, and the result normalization and
//! chart-state engine from `dbbench-benchmarks`.

pub use dbbench_benchmarks as benchmarks;
pub use dbbench_common as common;

/// Re-export common types and utilities
pub mod prelude {
    pub use crate::benchmarks::*;
    pub use crate::common::{DbBenchConfig, DbBenchError, Engine, EngineProfile, EngineProfiles, TestKind};
}
