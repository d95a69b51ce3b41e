use async_trait::async_trait;
use casebook_protocol::{ConversationRecord, CustomerId, RetrievalPath, ScoredConversation};
use casebook_store::{ConversationStore, StoreError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Scripted answer for one store path.
#[derive(Debug, Clone)]
pub enum Scripted {
    Results(Vec<ScoredConversation>),
    Fail(String),
}

impl Scripted {
    fn resolve(&self) -> Result<Vec<ScoredConversation>, StoreError> {
        match self {
            Scripted::Results(results) => Ok(results.clone()),
            Scripted::Fail(message) => Err(StoreError::Unavailable(message.clone())),
        }
    }
}

/// A call made against a [`StubStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Vector { customer: CustomerId, limit: usize },
    Text { customer: CustomerId, query: String, limit: usize },
    Scan { customer: CustomerId, limit: usize },
    ListCustomers,
}

/// In-memory store.
///
/// Paths without a script search the seeded records: vector search ranks by
/// cosine similarity, text search by the number of query terms found.
#[derive(Clone, Default)]
pub struct StubStore {
    records: Vec<ConversationRecord>,
    vector: Option<Scripted>,
    text: Option<Scripted>,
    scan: Option<Scripted>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ConversationRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn script_vector(mut self, script: Scripted) -> Self {
        self.vector = Some(script);
        self
    }

    pub fn script_text(mut self, script: Scripted) -> Self {
        self.text = Some(script);
        self
    }

    pub fn script_scan(mut self, script: Scripted) -> Self {
        self.scan = Some(script);
        self
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }

    fn customer_records(&self, customer: CustomerId) -> impl Iterator<Item = &ConversationRecord> {
        self.records
            .iter()
            .filter(move |record| record.customer_id == customer)
    }
}

fn rank(mut results: Vec<ScoredConversation>, limit: usize) -> Vec<ScoredConversation> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(limit);
    results
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl ConversationStore for StubStore {
    async fn vector_search(
        &self,
        customer: CustomerId,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        self.record(StoreCall::Vector { customer, limit });
        if let Some(script) = &self.vector {
            return script.resolve();
        }
        let results = self
            .customer_records(customer)
            .filter(|record| !record.embedding.is_empty())
            .map(|record| {
                let score = cosine(&record.embedding, embedding);
                ScoredConversation::new(record.clone(), score, RetrievalPath::Vector)
            })
            .collect();
        Ok(rank(results, limit))
    }

    async fn text_search(
        &self,
        customer: CustomerId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        self.record(StoreCall::Text {
            customer,
            query: query.to_string(),
            limit,
        });
        if let Some(script) = &self.text {
            return script.resolve();
        }
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let results = self
            .customer_records(customer)
            .filter_map(|record| {
                let haystack = record.text_for_embedding.to_lowercase();
                let hits = terms
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .count();
                (hits > 0).then(|| {
                    ScoredConversation::new(record.clone(), hits as f64, RetrievalPath::Text)
                })
            })
            .collect();
        Ok(rank(results, limit))
    }

    async fn scan(
        &self,
        customer: CustomerId,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        self.record(StoreCall::Scan { customer, limit });
        if let Some(script) = &self.scan {
            return script.resolve();
        }
        Ok(self
            .customer_records(customer)
            .take(limit)
            .cloned()
            .map(ScoredConversation::unranked)
            .collect())
    }

    async fn list_customers(&self) -> Result<Vec<CustomerId>, StoreError> {
        self.record(StoreCall::ListCustomers);
        let mut customers: Vec<CustomerId> =
            self.records.iter().map(|record| record.customer_id).collect();
        customers.sort_unstable();
        customers.dedup();
        Ok(customers)
    }
}
