//! Error types for transport, configuration and the console runtime.

use std::path::PathBuf;

use storefront_core::error::SeedError;

/// A single stats request failed. Never leaves the fetch path: it is
/// logged and replaced by the sentinel payload.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("decode stats from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to resolve HOME")]
    MissingHome,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("read seed {path}: {source}")]
    ReadSeed {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("build http client: {0}")]
    HttpClient(String),
    #[error("start runtime: {0}")]
    Runtime(std::io::Error),
    #[error("render: {0}")]
    Render(std::io::Error),
}
