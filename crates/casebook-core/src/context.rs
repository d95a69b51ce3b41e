//! Conversion of retrieved conversations into model context and citations.

use casebook_protocol::{
    ContextMessage, ConversationId, FormattedConversation, RetrievalPath, ScoredConversation,
};
use serde::{Deserialize, Serialize};

/// Reference to a conversation an answer was drawn from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub conversation_id: ConversationId,
    pub timestamp: String,
    pub score: f64,
    pub path: RetrievalPath,
}

/// Format ranked conversations for the generation prompt.
///
/// Quick-reply messages are UI chrome and are left out.
pub fn format_context(results: &[ScoredConversation]) -> Vec<FormattedConversation> {
    results
        .iter()
        .map(|result| FormattedConversation {
            conversation_id: result.record.conversation_id.clone(),
            timestamp: result.record.started_at(),
            similarity_score: round_score(result.score),
            conversation: result
                .record
                .messages
                .iter()
                .filter(|message| !message.is_quick_reply())
                .map(|message| ContextMessage {
                    role: message.role.clone(),
                    content: message.content.clone(),
                })
                .collect(),
        })
        .collect()
}

/// Citations for ranked results, in rank order.
pub fn citations(results: &[ScoredConversation]) -> Vec<Citation> {
    results
        .iter()
        .map(|result| Citation {
            conversation_id: result.record.conversation_id.clone(),
            timestamp: result.record.started_at(),
            score: round_score(result.score),
            path: result.path,
        })
        .collect()
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use casebook_protocol::{ConversationRecord, Message};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(messages: Vec<Message>) -> ConversationRecord {
        ConversationRecord {
            conversation_id: ConversationId::new("c-1"),
            customer_id: 42,
            // 2024-01-02 03:04:05 UTC
            start_time: 1_704_164_645_000,
            end_time: 1_704_165_000_000,
            messages,
            embedding: Vec::new(),
            text_for_embedding: String::new(),
        }
    }

    #[test]
    fn formats_timestamp_score_and_messages() {
        let mut quick = Message::new("bot", "Pick one");
        quick.quick_replies = Some(vec![json!("Yes"), json!("No")]);
        let mut empty_quick = Message::new("bot", "kept");
        empty_quick.quick_replies = Some(Vec::new());

        let results = vec![ScoredConversation::new(
            record(vec![
                Message::new("user", "Where is my refund?"),
                quick,
                empty_quick,
                Message::new("agent", "It was sent yesterday."),
            ]),
            0.876_54,
            RetrievalPath::Vector,
        )];

        let formatted = format_context(&results);
        assert_eq!(formatted.len(), 1);
        assert_eq!(formatted[0].timestamp, "2024-01-02 03:04:05");
        assert_eq!(formatted[0].similarity_score, 0.877);
        let roles: Vec<&str> = formatted[0]
            .conversation
            .iter()
            .map(|message| message.role.as_str())
            .collect();
        assert_eq!(roles, vec!["user", "bot", "agent"]);
        assert_eq!(formatted[0].conversation[1].content, "kept");
    }

    #[test]
    fn scan_results_have_zero_score() {
        let results = vec![ScoredConversation::unranked(record(Vec::new()))];
        let formatted = format_context(&results);
        assert_eq!(formatted[0].similarity_score, 0.0);
        assert!(formatted[0].conversation.is_empty());
    }

    #[test]
    fn citations_follow_rank_order() {
        let mut second = record(Vec::new());
        second.conversation_id = ConversationId::new("c-2");
        let results = vec![
            ScoredConversation::new(record(Vec::new()), 2.345_6, RetrievalPath::Text),
            ScoredConversation::new(second, 0.5, RetrievalPath::Vector),
        ];
        let cited = citations(&results);
        assert_eq!(
            cited,
            vec![
                Citation {
                    conversation_id: ConversationId::new("c-1"),
                    timestamp: "2024-01-02 03:04:05".to_string(),
                    score: 2.346,
                    path: RetrievalPath::Text,
                },
                Citation {
                    conversation_id: ConversationId::new("c-2"),
                    timestamp: "2024-01-02 03:04:05".to_string(),
                    score: 0.5,
                    path: RetrievalPath::Vector,
                },
            ]
        );
    }
}
