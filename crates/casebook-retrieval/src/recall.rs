//! Retrieval configuration.

pub use casebook_config::RetrievalMode;

/// Options for a single retrieval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalOptions {
    /// Retrieval mode to use.
    pub mode: RetrievalMode,
    /// Maximum number of conversations returned.
    pub limit: usize,
    /// Optional minimum score for ranked results.
    pub min_score: Option<f64>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::Hybrid,
            limit: 10,
            min_score: None,
        }
    }
}

impl RetrievalOptions {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }
}
