use casebook_retrieval::{Embedder, EmbeddingError, EmbeddingTaskType, GeminiEmbedder};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMBED_PATH: &str = "/v1beta/models/text-embedding-004:embedContent";

fn embedder(server: &MockServer) -> GeminiEmbedder {
    GeminiEmbedder::new("test-key", "text-embedding-004").with_endpoint(server.uri())
}

#[tokio::test]
async fn embeds_query_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "model": "models/text-embedding-004",
            "content": { "parts": [{ "text": "where is my refund" }] },
            "taskType": "RETRIEVAL_QUERY"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [0.25, -0.5, 1.0] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = embedder(&server)
        .embed("where is my refund")
        .await
        .expect("embedding");
    assert_eq!(values, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn forwards_document_task_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .and(body_partial_json(json!({ "taskType": "RETRIEVAL_DOCUMENT" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [1.0] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = embedder(&server)
        .with_task(EmbeddingTaskType::RetrievalDocument)
        .embed("transcript")
        .await
        .expect("embedding");
    assert_eq!(values.len(), 1);
}

#[tokio::test]
async fn surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })))
        .mount(&server)
        .await;

    let err = embedder(&server).embed("hello").await.unwrap_err();
    match err {
        EmbeddingError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn rejects_empty_and_mismatched_vectors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .and(body_partial_json(json!({ "content": { "parts": [{ "text": "empty" }] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [] }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .and(body_partial_json(json!({ "content": { "parts": [{ "text": "short" }] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": { "values": [0.1, 0.2] }
        })))
        .mount(&server)
        .await;

    let err = embedder(&server).embed("empty").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::Empty));

    let err = embedder(&server)
        .with_dimensions(Some(768))
        .embed("short")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EmbeddingError::DimensionMismatch {
            expected: 768,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EMBED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = embedder(&server).embed("hello").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::Decode(_)));
}
