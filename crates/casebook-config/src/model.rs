//! Configuration schema for Casebook.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Default Generative Language API endpoint for embedding and generation.
pub const DEFAULT_GOOGLE_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Root config for a Casebook deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CasebookConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl CasebookConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CasebookConfigBuilder {
        CasebookConfigBuilder::new()
    }
}

/// Builder for assembling a `CasebookConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CasebookConfigBuilder {
    config: CasebookConfig,
}

impl CasebookConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: CasebookConfig::default(),
        }
    }

    /// Replace the embedding service configuration.
    pub fn embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.config.embedding = embedding;
        self
    }

    /// Replace the generation service configuration.
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Replace the document store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the retrieval configuration.
    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    /// Replace the prompt template configuration.
    pub fn prompt(mut self, prompt: PromptConfig) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Finalize and return the built `CasebookConfig`.
    pub fn build(self) -> CasebookConfig {
        self.config
    }
}

/// Embedding API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub task_type: EmbeddingTaskType,
    /// Expected vector length; unchecked when unset.
    #[serde(default)]
    pub dimensions: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_google_endpoint(),
            model: default_embedding_model(),
            api_key_env: default_api_key_env(),
            task_type: EmbeddingTaskType::default(),
            dimensions: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.api_key_env)
    }
}

/// Embedding task type requested for query embeddings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingTaskType {
    #[default]
    RetrievalQuery,
    RetrievalDocument,
}

/// Chat-completion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_response_modalities")]
    pub response_modalities: Vec<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Attach the hosted search-grounding tool to requests.
    #[serde(default)]
    pub search_grounding: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_google_endpoint(),
            model: default_generation_model(),
            api_key_env: default_api_key_env(),
            response_modalities: default_response_modalities(),
            temperature: None,
            search_grounding: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.api_key_env)
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_uri_env")]
    pub uri_env: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_vector_index")]
    pub vector_index: String,
    #[serde(default = "default_text_index")]
    pub text_index: String,
    #[serde(default = "default_num_candidates")]
    pub num_candidates: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri_env: default_uri_env(),
            database: default_database(),
            collection: default_collection(),
            vector_index: default_vector_index(),
            text_index: default_text_index(),
            num_candidates: default_num_candidates(),
        }
    }
}

impl StoreConfig {
    /// Read the connection string from the configured environment variable.
    pub fn uri(&self) -> Result<String, ConfigError> {
        resolve_secret(&self.uri_env)
    }
}

/// Which search paths retrieval runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    Vector,
    Text,
    #[default]
    Hybrid,
}

impl RetrievalMode {
    pub fn uses_vector(self) -> bool {
        matches!(self, RetrievalMode::Vector | RetrievalMode::Hybrid)
    }

    pub fn uses_text(self) -> bool {
        matches!(self, RetrievalMode::Text | RetrievalMode::Hybrid)
    }
}

/// Retrieval defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub mode: RetrievalMode,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::default(),
            limit: default_limit(),
            min_score: None,
        }
    }
}

/// Prompt template text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_preamble")]
    pub preamble: String,
    #[serde(default = "default_no_context_instruction")]
    pub no_context_instruction: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            preamble: default_preamble(),
            no_context_instruction: default_no_context_instruction(),
        }
    }
}

/// Read a secret from an environment variable, treating empty as unset.
pub fn resolve_secret(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret {
            var: var.to_string(),
        }),
    }
}

fn default_google_endpoint() -> String {
    DEFAULT_GOOGLE_ENDPOINT.to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

fn default_generation_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_response_modalities() -> Vec<String> {
    vec!["TEXT".to_string()]
}

/// Default HTTP timeout for hosted APIs.
fn default_timeout_secs() -> u64 {
    60
}

fn default_uri_env() -> String {
    "MONGODB_URI".to_string()
}

fn default_database() -> String {
    "conversations_db".to_string()
}

fn default_collection() -> String {
    "conversations".to_string()
}

fn default_vector_index() -> String {
    "vector_index".to_string()
}

fn default_text_index() -> String {
    "text_index".to_string()
}

/// Candidate pool for approximate nearest-neighbour search.
fn default_num_candidates() -> u32 {
    100
}

/// Default number of conversations handed to the model.
fn default_limit() -> usize {
    10
}

fn default_preamble() -> String {
    "Based on the archive of support conversations with our customer:".to_string()
}

fn default_no_context_instruction() -> String {
    "If the context does not contain relevant information, say so.".to_string()
}
