//! Hybrid conversation retrieval for Casebook.
//!
//! Embeds the question, runs vector and keyword search against the
//! conversation store, merges the two ranked lists, and degrades through a
//! fallback chain when a path fails.

pub mod embedding;
pub mod error;
pub mod google;
pub mod merge;
pub mod recall;
pub mod retriever;

/// Embedding client interface and the Gemini implementation.
pub use embedding::{Embedder, GeminiEmbedder};
/// Embedding task types, shared with the config schema.
pub use casebook_config::EmbeddingTaskType;
/// Error types.
pub use error::{EmbeddingError, PathFailure, RetrievalError};
/// Result merging.
pub use merge::merge_results;
/// Retrieval modes and options.
pub use recall::{RetrievalMode, RetrievalOptions};
/// Retriever and its outcome.
pub use retriever::{RetrievalOutcome, RetrievalStrategy, Retriever};
