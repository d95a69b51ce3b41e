//! Retrieval over a customer's conversation archive with graceful degradation.

use crate::embedding::Embedder;
use crate::error::{PathFailure, RetrievalError};
use crate::merge::merge_results;
use crate::recall::{RetrievalMode, RetrievalOptions};
use casebook_protocol::{CustomerId, RetrievalPath, ScoredConversation};
use casebook_store::ConversationStore;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which path produced a retrieval result set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Vector and keyword results merged.
    Hybrid,
    /// Vector results only.
    VectorOnly,
    /// Keyword results only.
    TextOnly,
    /// Unranked scan of the customer's conversations.
    Scan,
}

impl fmt::Display for RetrievalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RetrievalStrategy::Hybrid => "hybrid",
            RetrievalStrategy::VectorOnly => "vector_only",
            RetrievalStrategy::TextOnly => "text_only",
            RetrievalStrategy::Scan => "scan",
        };
        f.write_str(label)
    }
}

/// Result of a retrieval, including any paths that failed along the way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalOutcome {
    pub results: Vec<ScoredConversation>,
    pub strategy: RetrievalStrategy,
    pub degradations: Vec<PathFailure>,
    /// Ranked results dropped for scoring below `min_score`.
    #[serde(default)]
    pub filtered: usize,
}

impl RetrievalOutcome {
    /// True when at least one path failed.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when results existed but all scored below `min_score`.
    pub fn is_filtered_out(&self) -> bool {
        self.results.is_empty() && self.filtered > 0
    }
}

/// Runs vector and keyword search for a customer and merges the results.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ConversationStore>,
}

impl fmt::Debug for Retriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriever").finish_non_exhaustive()
    }
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn ConversationStore>) -> Self {
        Self { embedder, store }
    }

    /// Store backing this retriever.
    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Retrieve the conversations most relevant to `query` for `customer`.
    ///
    /// Failed paths are recorded in [`RetrievalOutcome::degradations`]; only
    /// when every path including the scan fails is an error returned. When
    /// the vector path fails and the keyword path finds nothing, the scan
    /// runs as well.
    pub async fn retrieve(
        &self,
        customer: CustomerId,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        if options.limit == 0 {
            return Err(RetrievalError::InvalidLimit);
        }
        let limit = options.limit;
        let mut degradations = Vec::new();

        let vector = if options.mode.uses_vector() {
            match self.vector_path(customer, query, limit).await {
                Ok(results) => Some(results),
                Err(failure) => {
                    degradations.push(failure);
                    None
                }
            }
        } else {
            None
        };

        let text = if options.mode.uses_text() {
            match self.store.text_search(customer, query, limit).await {
                Ok(results) => Some(results),
                Err(err) => {
                    degradations.push(PathFailure::new(RetrievalPath::Text, err.to_string()));
                    None
                }
            }
        } else {
            None
        };

        let ranked = match (vector, text) {
            (Some(vector), Some(text)) => Some((
                merge_results(vector, text, limit),
                RetrievalStrategy::Hybrid,
            )),
            (Some(vector), None) => Some((vector, RetrievalStrategy::VectorOnly)),
            // An empty keyword fallback cannot tell a quiet customer from a missing one.
            (None, Some(text)) if text.is_empty() && options.mode.uses_vector() => None,
            (None, Some(mut text)) => {
                text.truncate(limit);
                Some((text, RetrievalStrategy::TextOnly))
            }
            (None, None) => None,
        };
        let Some((results, strategy)) = ranked else {
            let results = self.scan_path(customer, limit, &mut degradations).await?;
            return Ok(self.finish(
                customer,
                options.mode,
                results,
                RetrievalStrategy::Scan,
                degradations,
                0,
            ));
        };

        // Vector results standing in for a failed keyword path pass through as returned.
        let text_failed = strategy == RetrievalStrategy::VectorOnly && options.mode.uses_text();
        let (results, filtered) = match options.min_score {
            Some(min) if !text_failed => {
                let total = results.len();
                let kept: Vec<_> = results
                    .into_iter()
                    .filter(|result| result.score >= min)
                    .collect();
                let filtered = total - kept.len();
                (kept, filtered)
            }
            _ => (results, 0),
        };
        Ok(self.finish(
            customer,
            options.mode,
            results,
            strategy,
            degradations,
            filtered,
        ))
    }

    async fn vector_path(
        &self,
        customer: CustomerId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, PathFailure> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|err| PathFailure::new(RetrievalPath::Vector, err.to_string()))?;
        self.store
            .vector_search(customer, &embedding, limit)
            .await
            .map_err(|err| PathFailure::new(RetrievalPath::Vector, err.to_string()))
    }

    async fn scan_path(
        &self,
        customer: CustomerId,
        limit: usize,
        degradations: &mut Vec<PathFailure>,
    ) -> Result<Vec<ScoredConversation>, RetrievalError> {
        match self.store.scan(customer, limit).await {
            Ok(mut results) => {
                results.truncate(limit);
                Ok(results)
            }
            Err(err) => {
                degradations.push(PathFailure::new(RetrievalPath::Scan, err.to_string()));
                Err(RetrievalError::Exhausted {
                    failures: std::mem::take(degradations),
                })
            }
        }
    }

    fn finish(
        &self,
        customer: CustomerId,
        mode: RetrievalMode,
        results: Vec<ScoredConversation>,
        strategy: RetrievalStrategy,
        degradations: Vec<PathFailure>,
        filtered: usize,
    ) -> RetrievalOutcome {
        for failure in &degradations {
            warn!("retrieval degraded for customer {customer}: {failure}");
        }
        if filtered > 0 {
            debug!("dropped {filtered} conversations below min_score (customer={customer})");
        }
        if degradations.is_empty() {
            debug!(
                "retrieved {} conversations (customer={customer}, mode={mode:?}, strategy={strategy})",
                results.len()
            );
        } else {
            info!(
                "retrieved {} conversations via {strategy} after {} failed path(s) (customer={customer})",
                results.len(),
                degradations.len()
            );
        }
        RetrievalOutcome {
            results,
            strategy,
            degradations,
            filtered,
        }
    }
}
