//! Error types for answer generation and the assistant.

use casebook_retrieval::RetrievalError;
use casebook_store::StoreError;
use thiserror::Error;

/// Errors returned by answer generators.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The HTTP request could not be sent or its body read.
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("generation service error ({status}): {message}")]
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    #[error("failed to decode generation response: {0}")]
    Decode(String),
    /// The prompt was blocked by the service.
    #[error("prompt blocked: {0}")]
    Blocked(String),
    /// No candidate carried any text.
    #[error("model returned no text")]
    EmptyResponse,
}

/// Errors returned by the assistant and sessions.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// The question was empty or whitespace.
    #[error("question must not be empty")]
    EmptyQuestion,
    /// A session question was asked before a customer was selected.
    #[error("no customer selected")]
    NoCustomerSelected,
    /// Every retrieval path failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    /// The answer could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// The store could not list customers.
    #[error(transparent)]
    Store(#[from] StoreError),
}
