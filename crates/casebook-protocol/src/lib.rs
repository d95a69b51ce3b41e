//! Shared data model for Casebook: stored conversations, scored retrieval
//! results, and session turns.

mod conversation;
mod retrieval;
mod turn;

pub use conversation::{
    ConversationId, ConversationRecord, CustomerId, Message, TIMESTAMP_FORMAT, format_epoch_millis,
};
pub use retrieval::{ContextMessage, FormattedConversation, RetrievalPath, ScoredConversation};
pub use turn::{ConversationTurn, TurnRole};
