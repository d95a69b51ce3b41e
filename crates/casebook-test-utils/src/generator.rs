use async_trait::async_trait;
use casebook_core::{Generation, GenerationError, GenerationRequest, Generator, GroundingMetadata};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FixedGenerator {
    text: String,
    grounding: Option<GroundingMetadata>,
}

impl FixedGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: None,
        }
    }

    pub fn with_grounding(mut self, grounding: GroundingMetadata) -> Self {
        self.grounding = Some(grounding);
        self
    }
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<Generation, GenerationError> {
        Ok(Generation {
            text: self.text.clone(),
            grounding: self.grounding.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<Generation, GenerationError> {
        Err(GenerationError::Api {
            status: 500,
            message: "generation failed".to_string(),
        })
    }
}

/// Generator that records every prompt it receives.
#[derive(Debug, Clone)]
pub struct RecordingGenerator {
    text: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

impl Default for RecordingGenerator {
    fn default() -> Self {
        Self::new("ok")
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        self.prompts.lock().push(request.prompt);
        Ok(Generation {
            text: self.text.clone(),
            grounding: None,
        })
    }
}
