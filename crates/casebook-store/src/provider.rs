//! Conversation store abstraction.

use crate::error::StoreError;
use async_trait::async_trait;
use casebook_protocol::{CustomerId, ScoredConversation};

/// Read-only search interface over a customer-partitioned conversation archive.
///
/// Every query is scoped to a single customer; implementations must never
/// return another customer's conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Top-k conversations nearest to the query embedding.
    async fn vector_search(
        &self,
        customer: CustomerId,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError>;

    /// Top-k conversations by keyword relevance to the query text.
    async fn text_search(
        &self,
        customer: CustomerId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError>;

    /// Up to `limit` conversations for the customer, unranked.
    async fn scan(
        &self,
        customer: CustomerId,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError>;

    /// Distinct customer ids present in the archive, ascending.
    async fn list_customers(&self) -> Result<Vec<CustomerId>, StoreError>;
}
