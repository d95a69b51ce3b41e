//! Query embedding clients.

use crate::error::EmbeddingError;
use crate::google::{API_KEY_HEADER, DEFAULT_GOOGLE_ENDPOINT, describe_error_body};
use async_trait::async_trait;
use casebook_config::EmbeddingTaskType;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Converts text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Embedder backed by the Gemini `embedContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    task: EmbeddingTaskType,
    dimensions: Option<usize>,
}

impl GeminiEmbedder {
    /// Create an embedder for `model` using the default endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key, model)
    }

    /// Create an embedder with a request timeout.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, model))
    }

    fn with_client(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            api_key: api_key.into(),
            model: model.trim_start_matches("models/").to_string(),
            endpoint: DEFAULT_GOOGLE_ENDPOINT.to_string(),
            task: EmbeddingTaskType::default(),
            dimensions: None,
        }
    }

    /// Override the API endpoint (used for proxies and tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the task type sent with each request.
    pub fn with_task(mut self, task: EmbeddingTaskType) -> Self {
        self.task = task;
        self
    }

    /// Require returned vectors to have this length.
    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Model name without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:embedContent",
            self.endpoint, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
    task_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

/// Wire name of a task type.
fn task_type_name(task: EmbeddingTaskType) -> &'static str {
    match task {
        EmbeddingTaskType::RetrievalQuery => "RETRIEVAL_QUERY",
        EmbeddingTaskType::RetrievalDocument => "RETRIEVAL_DOCUMENT",
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: vec![Part { text }],
            },
            task_type: task_type_name(self.task),
        };

        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: describe_error_body(&body),
            });
        }

        let body = response.text().await?;
        let parsed: EmbedContentResponse =
            serde_json::from_str(&body).map_err(|err| EmbeddingError::Decode(err.to_string()))?;
        let values = parsed.embedding.values;
        if values.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        match self.dimensions {
            Some(expected) if values.len() != expected => {
                return Err(EmbeddingError::DimensionMismatch {
                    expected,
                    actual: values.len(),
                });
            }
            _ => {}
        }
        debug!(
            "embedded text (model={}, text_len={}, dims={})",
            self.model,
            text.len(),
            values.len()
        );
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strips_model_prefix_and_trailing_slash() {
        let embedder = GeminiEmbedder::new("key", "models/text-embedding-004")
            .with_endpoint("http://localhost:9999/");
        assert_eq!(embedder.model(), "text-embedding-004");
        assert_eq!(
            embedder.url(),
            "http://localhost:9999/v1beta/models/text-embedding-004:embedContent"
        );
    }

    #[test]
    fn request_body_uses_wire_names() {
        let request = EmbedContentRequest {
            model: "models/text-embedding-004".to_string(),
            content: Content {
                parts: vec![Part { text: "hello" }],
            },
            task_type: task_type_name(EmbeddingTaskType::RetrievalQuery),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({
                "model": "models/text-embedding-004",
                "content": { "parts": [{ "text": "hello" }] },
                "taskType": "RETRIEVAL_QUERY"
            })
        );
    }
}
