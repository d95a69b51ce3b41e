//! Construction of live clients from configuration.

use anyhow::Context;
use casebook_config::CasebookConfig;
use casebook_core::{Assistant, GeminiGenerator, PromptTemplate, retrieval_options};
use casebook_retrieval::{GeminiEmbedder, Retriever};
use casebook_store::MongoConversationStore;
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Connect to the conversation store named by the config.
pub async fn connect_store(config: &CasebookConfig) -> anyhow::Result<MongoConversationStore> {
    let store_uri = config.store.uri().context("store URI is not set")?;
    MongoConversationStore::connect(&store_uri, &config.store)
        .await
        .context("failed to connect to conversation store")
}

/// Connect the store and build the embedding and generation clients.
///
/// Secrets are read from the environment variables the config names.
pub async fn build_assistant(config: &CasebookConfig) -> anyhow::Result<Assistant> {
    let embedding_key = config
        .embedding
        .api_key()
        .context("embedding API key is not set")?;
    let generation_key = config
        .generation
        .api_key()
        .context("generation API key is not set")?;

    let embedder = GeminiEmbedder::with_timeout(
        embedding_key,
        &config.embedding.model,
        Duration::from_secs(config.embedding.timeout_secs),
    )
    .context("failed to build embedding client")?
    .with_endpoint(&config.embedding.endpoint)
    .with_task(config.embedding.task_type)
    .with_dimensions(config.embedding.dimensions);

    let store = connect_store(config).await?;

    let generator = GeminiGenerator::from_config(&config.generation, generation_key)
        .context("failed to build generation client")?;

    info!(
        "assistant ready (embedding_model={}, generation_model={}, mode={:?}, limit={})",
        embedder.model(),
        generator.model(),
        config.retrieval.mode,
        config.retrieval.limit
    );
    Ok(Assistant::new(
        Retriever::new(Arc::new(embedder), Arc::new(store)),
        Arc::new(generator),
        PromptTemplate::from(&config.prompt),
        retrieval_options(&config.retrieval),
    ))
}
