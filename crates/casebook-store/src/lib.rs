//! Read access to the historical conversation archive.

pub mod error;
pub mod mongo;
pub mod provider;

/// Store error type.
pub use error::StoreError;
/// MongoDB Atlas backed store.
pub use mongo::MongoConversationStore;
/// Store interface used by retrieval.
pub use provider::ConversationStore;
