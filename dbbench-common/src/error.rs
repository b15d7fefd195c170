use thiserror::Error;

/// Main error type for dbbench
#[derive(Error, Debug)]
pub enum DbBenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown test kind: {0}")]
    UnknownTestKind(String),
}

impl From<serde_json::Error> for DbBenchError {
    fn from(err: serde_json::Error) -> Self {
        DbBenchError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DbBenchError {
    fn from(err: toml::de::Error) -> Self {
        DbBenchError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DbBenchError {
    fn from(err: toml::ser::Error) -> Self {
        DbBenchError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DbBenchError>;
