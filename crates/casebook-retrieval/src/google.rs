//! Helpers shared by the Generative Language API clients.

use serde::Deserialize;

pub use casebook_config::DEFAULT_GOOGLE_ENDPOINT;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Render an error body, preferring the Google error envelope when present.
pub fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{status}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
