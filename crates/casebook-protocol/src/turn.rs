//! Session transcript turns.

use crate::retrieval::FormattedConversation;
use serde::{Deserialize, Serialize};

/// Speaker of a session turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Label used when replaying history into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "Assistant",
        }
    }
}

/// One turn of an interactive session; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    /// Context the assistant answered from, when attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<FormattedConversation>>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            context: None,
        }
    }

    pub fn assistant(content: impl Into<String>, context: Vec<FormattedConversation>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            context: Some(context),
        }
    }
}
