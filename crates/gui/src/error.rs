//! Error types for the evaluation cycle.
//!
//! Every variant is terminal for the current cycle: nothing retries, the
//! caller logs it and leaves the previous document in place.

use std::path::PathBuf;

use thiserror::Error;

/// A definition or model could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("unknown document format: {0}")]
    UnknownFormat(String),

    #[error("document version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },
}

/// A single geometry leaf could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("leaf of type '{type_name}' is not valid JSON: {source}")]
    InvalidJson {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown geometry type '{0}'")]
    UnknownType(String),

    #[error("invalid {type_name} payload: {reason}")]
    InvalidPayload { type_name: String, reason: String },

    #[error("invalid embedded document: {0}")]
    Document(String),
}

/// The remote evaluation failed or returned unusable data.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no definition loaded")]
    NoDefinition,

    #[error("no mesh objects to combine")]
    NoMeshes,

    #[error("compute request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("compute request timed out")]
    Timeout,

    #[error("compute service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("compute service reported errors: {}", .0.join("; "))]
    Remote(Vec<String>),

    #[error("malformed compute response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<reqwest::Error> for EvaluationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EvaluationError::Timeout
        } else if err.is_decode() {
            EvaluationError::MalformedResponse(err.to_string())
        } else {
            EvaluationError::Network(err)
        }
    }
}

/// Compute endpoint configuration was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("compute endpoint must not be empty")]
    EmptyEndpoint,

    #[error("invalid compute endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
