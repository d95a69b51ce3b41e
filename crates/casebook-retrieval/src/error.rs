//! Error types for embedding and retrieval.

use casebook_protocol::RetrievalPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors returned by embedding clients.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The HTTP request could not be sent or its body read.
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("embedding service error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("failed to decode embedding response: {0}")]
    Decode(String),
    /// The service returned an empty vector.
    #[error("embedding service returned an empty vector")]
    Empty,
    /// The vector length differs from the configured dimensions.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A search path that failed during retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathFailure {
    pub path: RetrievalPath,
    pub message: String,
}

impl PathFailure {
    pub fn new(path: RetrievalPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for PathFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} path: {}", self.path, self.message)
    }
}

/// Errors returned by the retriever.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Every path, including the plain scan, failed.
    #[error("all retrieval paths failed: {}", join_failures(.failures))]
    Exhausted { failures: Vec<PathFailure> },
    /// A result limit of zero was requested.
    #[error("retrieval limit must be greater than zero")]
    InvalidLimit,
}

fn join_failures(failures: &[PathFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
