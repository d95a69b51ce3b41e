//! MongoDB Atlas conversation store using `$vectorSearch` and `$search`.

use crate::error::StoreError;
use crate::provider::ConversationStore;
use async_trait::async_trait;
use casebook_config::StoreConfig;
use casebook_protocol::{ConversationRecord, CustomerId, RetrievalPath, ScoredConversation};
use futures_util::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::{Client, Collection};

/// Field holding the customer partition key.
const CUSTOMER_FIELD: &str = "contact_id";
/// Field holding the precomputed embedding.
const EMBEDDING_FIELD: &str = "embedding";
/// Field holding the flattened transcript.
const TEXT_FIELD: &str = "text_for_embedding";
/// Projected field carrying the search score.
const SCORE_FIELD: &str = "search_score";

/// Index names and tuning for Atlas search stages.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub vector_index: String,
    pub text_index: String,
    pub num_candidates: u32,
}

impl From<&StoreConfig> for SearchSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            vector_index: config.vector_index.clone(),
            text_index: config.text_index.clone(),
            num_candidates: config.num_candidates,
        }
    }
}

/// Conversation store backed by a MongoDB Atlas collection.
#[derive(Debug, Clone)]
pub struct MongoConversationStore {
    collection: Collection<Document>,
    settings: SearchSettings,
}

impl MongoConversationStore {
    /// Connect to the cluster and bind the configured collection.
    pub async fn connect(uri: &str, config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);
        info!(
            "connected conversation store (database={}, collection={})",
            config.database, config.collection
        );
        Ok(Self::from_collection(collection, SearchSettings::from(config)))
    }

    /// Wrap an already-bound collection.
    pub fn from_collection(collection: Collection<Document>, settings: SearchSettings) -> Self {
        Self {
            collection,
            settings,
        }
    }

    async fn run_pipeline(
        &self,
        pipeline: Vec<Document>,
        path: RetrievalPath,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        let documents: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;
        documents
            .into_iter()
            .map(|document| decode_scored(document, path))
            .collect()
    }
}

#[async_trait]
impl ConversationStore for MongoConversationStore {
    async fn vector_search(
        &self,
        customer: CustomerId,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        let pipeline = vector_pipeline(&self.settings, customer, embedding, limit);
        let results = self.run_pipeline(pipeline, RetrievalPath::Vector).await?;
        debug!(
            "vector search (customer={}, dims={}, returned={})",
            customer,
            embedding.len(),
            results.len()
        );
        Ok(results)
    }

    async fn text_search(
        &self,
        customer: CustomerId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        let pipeline = text_pipeline(&self.settings, customer, query, limit);
        let results = self.run_pipeline(pipeline, RetrievalPath::Text).await?;
        debug!(
            "text search (customer={}, query_len={}, returned={})",
            customer,
            query.len(),
            results.len()
        );
        Ok(results)
    }

    async fn scan(
        &self,
        customer: CustomerId,
        limit: usize,
    ) -> Result<Vec<ScoredConversation>, StoreError> {
        let documents: Vec<Document> = self
            .collection
            .find(doc! { CUSTOMER_FIELD: customer })
            .projection(record_projection(None))
            .limit(clamp_i64(limit))
            .await?
            .try_collect()
            .await?;
        debug!(
            "scan (customer={}, returned={})",
            customer,
            documents.len()
        );
        documents
            .into_iter()
            .map(|document| decode_scored(document, RetrievalPath::Scan))
            .collect()
    }

    async fn list_customers(&self) -> Result<Vec<CustomerId>, StoreError> {
        let values = self.collection.distinct(CUSTOMER_FIELD, doc! {}).await?;
        let mut customers: Vec<CustomerId> = values
            .iter()
            .filter_map(|value| {
                let id = customer_id_from_bson(value);
                if id.is_none() {
                    debug!("skipping non-numeric customer id: {value}");
                }
                id
            })
            .collect();
        customers.sort_unstable();
        customers.dedup();
        Ok(customers)
    }
}

fn clamp_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Fields returned for every record, plus the score meta field when ranked.
fn record_projection(score_meta: Option<&str>) -> Document {
    let mut projection = doc! {
        "conversation_id": 1,
        CUSTOMER_FIELD: 1,
        "start_time": 1,
        "end_time": 1,
        "messages": 1,
        TEXT_FIELD: 1,
    };
    if let Some(meta) = score_meta {
        projection.insert(SCORE_FIELD, doc! { "$meta": meta });
    }
    projection
}

/// `$vectorSearch` pipeline filtered to one customer.
pub(crate) fn vector_pipeline(
    settings: &SearchSettings,
    customer: CustomerId,
    embedding: &[f32],
    limit: usize,
) -> Vec<Document> {
    let query_vector: Vec<Bson> = embedding
        .iter()
        .map(|value| Bson::Double(f64::from(*value)))
        .collect();
    let num_candidates = (settings.num_candidates as usize).max(limit);
    vec![
        doc! {
            "$vectorSearch": {
                "index": settings.vector_index.as_str(),
                "path": EMBEDDING_FIELD,
                "queryVector": query_vector,
                "numCandidates": clamp_i64(num_candidates),
                "limit": clamp_i64(limit),
                "filter": { CUSTOMER_FIELD: { "$eq": customer } },
            }
        },
        doc! { "$project": record_projection(Some("vectorSearchScore")) },
    ]
}

/// Atlas `$search` keyword pipeline filtered to one customer.
pub(crate) fn text_pipeline(
    settings: &SearchSettings,
    customer: CustomerId,
    query: &str,
    limit: usize,
) -> Vec<Document> {
    vec![
        doc! {
            "$search": {
                "index": settings.text_index.as_str(),
                "compound": {
                    "must": [{ "text": { "query": query, "path": TEXT_FIELD } }],
                    "filter": [{ "equals": { "path": CUSTOMER_FIELD, "value": customer } }],
                },
            }
        },
        doc! { "$limit": clamp_i64(limit) },
        doc! { "$project": record_projection(Some("searchScore")) },
    ]
}

/// Decode a result document and attach its projected score.
pub(crate) fn decode_scored(
    mut document: Document,
    path: RetrievalPath,
) -> Result<ScoredConversation, StoreError> {
    let score = match document.remove(SCORE_FIELD) {
        Some(Bson::Double(value)) => value,
        Some(Bson::Int32(value)) => f64::from(value),
        Some(Bson::Int64(value)) => value as f64,
        _ => 0.0,
    };
    document.remove("_id");
    let record: ConversationRecord =
        bson::from_document(document).map_err(|err| StoreError::Decode(err.to_string()))?;
    Ok(ScoredConversation::new(record, score, path))
}

fn customer_id_from_bson(value: &Bson) -> Option<CustomerId> {
    match value {
        Bson::Int32(id) => Some(i64::from(*id)),
        Bson::Int64(id) => Some(*id),
        Bson::Double(id) if id.fract() == 0.0 && id.is_finite() => Some(*id as i64),
        Bson::String(id) => id.trim().parse().ok(),
        _ => None,
    }
}
