//! Shared error types for the services crate.

use thiserror::Error;

use lwh_core::model::CourseId;
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the remote course API port.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted when a local store cannot persist a mutation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the exchange-rate source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RateError {
    #[error("rate request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("rate source unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `CheckoutService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("order already being processed")]
    AlreadyProcessing,
    #[error("processing failed for {} course(s)", failed.len())]
    ProcessingFailed { failed: Vec<CourseId> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted while reading client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}
