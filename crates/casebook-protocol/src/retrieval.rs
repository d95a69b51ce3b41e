//! Scored retrieval results and the formatted context handed to the model.

use crate::conversation::{ConversationId, ConversationRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Search path that produced a result score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalPath {
    /// Embedding similarity search.
    Vector,
    /// Keyword relevance search.
    Text,
    /// Unranked filtered listing.
    Scan,
}

impl RetrievalPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalPath::Vector => "vector",
            RetrievalPath::Text => "text",
            RetrievalPath::Scan => "scan",
        }
    }
}

impl fmt::Display for RetrievalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation record annotated with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredConversation {
    pub record: ConversationRecord,
    /// Relevance score; zero for scan results.
    pub score: f64,
    pub path: RetrievalPath,
}

impl ScoredConversation {
    pub fn new(record: ConversationRecord, score: f64, path: RetrievalPath) -> Self {
        Self {
            record,
            score,
            path,
        }
    }

    /// Unranked result from a plain scan.
    pub fn unranked(record: ConversationRecord) -> Self {
        Self::new(record, 0.0, RetrievalPath::Scan)
    }

    pub fn id(&self) -> &ConversationId {
        &self.record.conversation_id
    }
}

/// Message kept in the model context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextMessage {
    pub role: String,
    pub content: String,
}

/// Compact conversation shape embedded in the generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedConversation {
    pub conversation_id: ConversationId,
    /// Start time as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    /// Score rounded to three decimals.
    pub similarity_score: f64,
    pub conversation: Vec<ContextMessage>,
}
