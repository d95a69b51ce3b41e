//! Answer generation clients.

use crate::error::GenerationError;
use async_trait::async_trait;
use casebook_config::GenerationConfig;
use casebook_retrieval::google::{API_KEY_HEADER, DEFAULT_GOOGLE_ENDPOINT, describe_error_body};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Web source cited by search grounding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingSource {
    pub uri: String,
    pub title: Option<String>,
}

/// Search grounding attached to a generated answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingMetadata {
    /// Rendered HTML of the search suggestion widget.
    pub search_entry_point: Option<String>,
    pub web_search_queries: Vec<String>,
    pub sources: Vec<GroundingSource>,
}

/// Generated answer text with optional grounding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
}

/// Produces an answer for a prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError>;
}

/// Generator backed by the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    response_modalities: Vec<String>,
    temperature: Option<f32>,
    search_grounding: bool,
}

impl GeminiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key, model)
    }

    /// Build a generator from config with the resolved API key.
    pub fn from_config(
        config: &GenerationConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let mut generator = Self::with_client(client, api_key, &config.model)
            .with_endpoint(&config.endpoint)
            .with_search_grounding(config.search_grounding);
        generator.response_modalities = config.response_modalities.clone();
        generator.temperature = config.temperature;
        Ok(generator)
    }

    fn with_client(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            api_key: api_key.into(),
            model: model.trim_start_matches("models/").to_string(),
            endpoint: DEFAULT_GOOGLE_ENDPOINT.to_string(),
            response_modalities: vec!["TEXT".to_string()],
            temperature: None,
            search_grounding: false,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Enable the Google Search grounding tool.
    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationSettings {
                response_modalities: &self.response_modalities,
                temperature: self.temperature,
            },
            tools: self
                .search_grounding
                .then(|| vec![RequestTool::default()]),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationSettings<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<RequestTool>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings<'a> {
    response_modalities: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Default, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    grounding_metadata: Option<ResponseGrounding>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseGrounding {
    search_entry_point: Option<SearchEntryPoint>,
    #[serde(default)]
    web_search_queries: Vec<String>,
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEntryPoint {
    rendered_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl From<ResponseGrounding> for GroundingMetadata {
    fn from(grounding: ResponseGrounding) -> Self {
        Self {
            search_entry_point: grounding
                .search_entry_point
                .and_then(|entry| entry.rendered_content),
            web_search_queries: grounding.web_search_queries,
            sources: grounding
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    web.uri.map(|uri| GroundingSource {
                        uri,
                        title: web.title,
                    })
                })
                .collect(),
        }
    }
}

/// Extract the answer from a decoded response.
fn into_generation(response: GenerateContentResponse) -> Result<Generation, GenerationError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(GenerationError::Blocked(reason)),
            None => Err(GenerationError::EmptyResponse),
        };
    };
    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(Generation {
        text,
        grounding: candidate.grounding_metadata.map(GroundingMetadata::from),
    })
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<Generation, GenerationError> {
        let body = self.request_body(&request.prompt);
        let response = self
            .client
            .post(self.url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: describe_error_body(&body),
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|err| GenerationError::Decode(err.to_string()))?;
        let generation = into_generation(parsed)?;
        debug!(
            "generated answer (model={}, prompt_len={}, answer_len={}, grounded={})",
            self.model,
            request.prompt.len(),
            generation.text.len(),
            generation.grounding.is_some()
        );
        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_body_omits_optional_fields_by_default() {
        let generator = GeminiGenerator::new("key", "gemini-2.0-flash-exp");
        let body = serde_json::to_value(generator.request_body("hi")).expect("serialize");
        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }],
                "generationConfig": { "responseModalities": ["TEXT"] }
            })
        );
    }

    #[test]
    fn request_body_carries_temperature_and_search_tool() {
        let generator = GeminiGenerator::new("key", "models/gemini-2.0-flash-exp")
            .with_temperature(Some(0.5))
            .with_search_grounding(true);
        assert_eq!(generator.model(), "gemini-2.0-flash-exp");
        let body = serde_json::to_value(generator.request_body("hi")).expect("serialize");
        assert_eq!(body["generationConfig"]["temperature"], json!(0.5));
        assert_eq!(body["tools"], json!([{ "googleSearch": {} }]));
    }

    #[test]
    fn joins_text_parts_and_maps_grounding() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "there" }] },
                "groundingMetadata": {
                    "searchEntryPoint": { "renderedContent": "<div>search</div>" },
                    "webSearchQueries": ["refund policy"],
                    "groundingChunks": [
                        { "web": { "uri": "https://example.com/refunds", "title": "Refunds" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        }))
        .expect("decode");
        let generation = into_generation(response).expect("generation");
        assert_eq!(generation.text, "Hello there");
        assert_eq!(
            generation.grounding,
            Some(GroundingMetadata {
                search_entry_point: Some("<div>search</div>".to_string()),
                web_search_queries: vec!["refund policy".to_string()],
                sources: vec![GroundingSource {
                    uri: "https://example.com/refunds".to_string(),
                    title: Some("Refunds".to_string()),
                }],
            })
        );
    }

    #[test]
    fn blocked_and_empty_responses_are_errors() {
        let blocked: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .expect("decode");
        assert!(matches!(
            into_generation(blocked),
            Err(GenerationError::Blocked(reason)) if reason == "SAFETY"
        ));

        let empty: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "STOP" }]
        }))
        .expect("decode");
        assert!(matches!(
            into_generation(empty),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            into_generation(GenerateContentResponse::default()),
            Err(GenerationError::EmptyResponse)
        ));
    }
}
