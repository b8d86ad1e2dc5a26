//! Error types for document ingestion and external-file parsing.
//!
//! The normalizer itself never surfaces an error to its caller — every
//! failure inside the pipeline is recovered locally (the affected ref is
//! left unchanged) and logged. [`NormalizeError`] exists for the parser
//! abstraction and the ingestion helpers on [`Node`](crate::Node), where
//! callers do need to see what went wrong.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{path} did not parse to a schema object")]
    NotASchema { path: String },
}
