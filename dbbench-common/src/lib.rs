pub mod types;
pub mod error;
pub mod config;

pub use types::*;
pub use error::{DbBenchError, Result};
pub use config::{
    ConfigSource, DbBenchConfig, EndpointConfig, EngineProfiles, ViewConfig,
};
