//! Question answering over a customer's support history.
//!
//! This crate formats retrieved conversations into model context, builds the
//! generation prompt, calls the answer generator, and tracks interactive
//! session transcripts.

pub mod assistant;
pub mod context;
pub mod error;
pub mod generation;
pub mod prompt;
pub mod session;

/// Assistant facade and its outcomes.
pub use assistant::{Answer, AskOutcome, Assistant, retrieval_options};
/// Context formatting for the model prompt.
pub use context::{Citation, citations, format_context};
/// Error types.
pub use error::{AssistantError, GenerationError};
/// Answer generation interface and the Gemini implementation.
pub use generation::{
    GeminiGenerator, Generation, GenerationRequest, Generator, GroundingMetadata, GroundingSource,
};
pub use prompt::PromptTemplate;
pub use session::Session;
