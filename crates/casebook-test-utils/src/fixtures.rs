use casebook_protocol::{
    ConversationId, ConversationRecord, CustomerId, Message, RetrievalPath, ScoredConversation,
};

/// Builder for conversation records used in tests.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: ConversationRecord,
}

impl RecordBuilder {
    pub fn new(id: impl Into<String>, customer: CustomerId) -> Self {
        Self {
            record: ConversationRecord {
                conversation_id: ConversationId::new(id),
                customer_id: customer,
                start_time: 1_700_000_000_000,
                end_time: 1_700_000_600_000,
                messages: Vec::new(),
                embedding: Vec::new(),
                text_for_embedding: String::new(),
            },
        }
    }

    pub fn started_at(mut self, millis: i64) -> Self {
        self.record.start_time = millis;
        self.record.end_time = millis + 600_000;
        self
    }

    pub fn message(mut self, role: &str, content: &str) -> Self {
        self.record.messages.push(Message::new(role, content));
        self.refresh_text();
        self
    }

    pub fn quick_reply(mut self, role: &str, content: &str, replies: &[&str]) -> Self {
        let mut message = Message::new(role, content);
        message.quick_replies = Some(
            replies
                .iter()
                .map(|reply| serde_json::Value::String((*reply).to_string()))
                .collect(),
        );
        self.record.messages.push(message);
        self
    }

    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.record.embedding = embedding;
        self
    }

    pub fn build(self) -> ConversationRecord {
        self.record
    }

    fn refresh_text(&mut self) {
        self.record.text_for_embedding = self
            .record
            .messages
            .iter()
            .filter(|message| !message.is_quick_reply())
            .map(|message| format!("{}: {}", message.role, message.content))
            .collect::<Vec<_>>()
            .join("\n");
    }
}

/// Scored result for a bare record with a single user message.
pub fn scored(id: &str, customer: CustomerId, score: f64, path: RetrievalPath) -> ScoredConversation {
    let record = RecordBuilder::new(id, customer)
        .message("user", &format!("conversation {id}"))
        .build();
    ScoredConversation::new(record, score, path)
}
