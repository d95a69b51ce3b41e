//! Interactive session transcripts.

use crate::assistant::{AskOutcome, Assistant};
use crate::error::AssistantError;
use casebook_protocol::{ConversationTurn, CustomerId};
use log::info;
use uuid::Uuid;

/// In-memory transcript of an interactive session.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    customer: Option<CustomerId>,
    turns: Vec<ConversationTurn>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: None,
            turns: Vec::new(),
        }
    }

    pub fn for_customer(customer: CustomerId) -> Self {
        let mut session = Self::new();
        session.customer = Some(customer);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn customer(&self) -> Option<CustomerId> {
        self.customer
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Switch the selected customer. The transcript is kept.
    pub fn select_customer(&mut self, customer: CustomerId) {
        info!(
            "selected customer (session_id={}, customer={customer})",
            self.id
        );
        self.customer = Some(customer);
    }

    /// Ask a question for the selected customer.
    ///
    /// Only answered questions are appended to the transcript.
    pub async fn ask(
        &mut self,
        assistant: &Assistant,
        question: &str,
    ) -> Result<AskOutcome, AssistantError> {
        let customer = self.customer.ok_or(AssistantError::NoCustomerSelected)?;
        let outcome = assistant.ask(customer, question, &self.turns).await?;
        if let AskOutcome::Answered(answer) = &outcome {
            self.turns.push(ConversationTurn::user(question.trim()));
            self.turns.push(ConversationTurn::assistant(
                answer.text.clone(),
                answer.context.clone(),
            ));
        }
        Ok(outcome)
    }
}
