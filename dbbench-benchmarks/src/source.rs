//! Result sources
//!
//! A source runs one benchmark endpoint and hands back its raw payload.
//! [`HttpSource`] talks to a live benchmark backend; [`FileSource`] replays
//! payloads captured from an earlier run.

use async_trait::async_trait;
use dbbench_common::EndpointConfig;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Untyped payload of one benchmark run; its shape is fixed per test kind
pub type RawResult = serde_json::Value;

/// Failure to obtain a raw result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request to '{path}' timed out")]
    Timeout { path: String },

    #[error("'{path}' returned HTTP {status}")]
    Status { status: u16, path: String },

    #[error("response from '{path}' is not valid JSON: {reason}")]
    Decode { path: String, reason: String },

    #[error("no saved result at {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(String),
}

/// Remote operation collaborator: one request per run, no body
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Run the benchmark at `path` and return its payload
    async fn fetch(&self, path: &str) -> Result<RawResult, TransportError>;
}

#[async_trait]
impl<S: ResultSource + ?Sized> ResultSource for Box<S> {
    async fn fetch(&self, path: &str) -> Result<RawResult, TransportError> {
        (**self).fetch(path).await
    }
}

/// Benchmark backend reached over HTTP
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), Duration::from_millis(config.timeout_ms))
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ResultSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<RawResult, TransportError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    path: path.to_string(),
                }
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .json::<RawResult>()
            .await
            .map_err(|e| TransportError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Replays payloads saved as `{dir}/{path}.json`
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_for(&self, path: &str) -> PathBuf {
        self.dir.join(format!("{}.json", path))
    }
}

#[async_trait]
impl ResultSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<RawResult, TransportError> {
        let file = self.file_for(path);
        debug!("replaying {}", file.display());

        let content = tokio::fs::read_to_string(&file).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TransportError::NotFound(file.clone()),
            _ => TransportError::Io(format!("{}: {}", file.display(), e)),
        })?;

        serde_json::from_str(&content).map_err(|e| TransportError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
