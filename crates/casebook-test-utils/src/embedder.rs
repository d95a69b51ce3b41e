use async_trait::async_trait;
use casebook_retrieval::{Embedder, EmbeddingError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Embedder returning the same vector for every text.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    embedding: Vec<f32>,
    texts: Arc<Mutex<Vec<String>>>,
}

impl FixedEmbedder {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts embedded so far.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.texts.lock().push(text.to_string());
        Ok(self.embedding.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FailingEmbedder {
    message: String,
}

impl FailingEmbedder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for FailingEmbedder {
    fn default() -> Self {
        Self::new("embedding service unavailable")
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: self.message.clone(),
        })
    }
}
