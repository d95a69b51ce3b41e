//! Retrieval-augmented question answering for a single customer.

use crate::context::{Citation, citations, format_context};
use crate::error::AssistantError;
use crate::generation::{GenerationRequest, Generator, GroundingMetadata};
use crate::prompt::PromptTemplate;
use casebook_config::RetrievalConfig;
use casebook_protocol::{ConversationTurn, CustomerId, FormattedConversation};
use casebook_retrieval::{RetrievalOptions, RetrievalOutcome, Retriever};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Answer with everything it was drawn from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub text: String,
    pub grounding: Option<GroundingMetadata>,
    pub citations: Vec<Citation>,
    /// Context exactly as it was given to the model.
    pub context: Vec<FormattedConversation>,
    /// Raw retrieval result, including any degraded paths.
    pub retrieval: RetrievalOutcome,
}

/// Result of asking a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AskOutcome {
    Answered(Answer),
    /// The customer has no matching conversations; the generator was not called.
    NoConversations { customer: CustomerId },
    /// Every ranked match scored below `min_score`; the generator was not called.
    BelowMinScore {
        customer: CustomerId,
        filtered: usize,
    },
}

/// Map configured retrieval settings onto retriever options.
pub fn retrieval_options(config: &RetrievalConfig) -> RetrievalOptions {
    RetrievalOptions {
        mode: config.mode,
        limit: config.limit,
        min_score: config.min_score,
    }
}

/// Answers questions about a customer from their support history.
#[derive(Clone)]
pub struct Assistant {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    template: PromptTemplate,
    options: RetrievalOptions,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant")
            .field("template", &self.template)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn Generator>,
        template: PromptTemplate,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            retriever,
            generator,
            template,
            options,
        }
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }

    /// Replace the retrieval options used by later questions.
    pub fn with_options(mut self, options: RetrievalOptions) -> Self {
        self.options = options;
        self
    }

    /// Answer `question` for `customer`, replaying `history` into the prompt.
    pub async fn ask(
        &self,
        customer: CustomerId,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<AskOutcome, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let retrieval = self
            .retriever
            .retrieve(customer, question, &self.options)
            .await?;
        if retrieval.is_filtered_out() {
            info!(
                "all {} matches scored below min_score (customer={customer})",
                retrieval.filtered
            );
            return Ok(AskOutcome::BelowMinScore {
                customer,
                filtered: retrieval.filtered,
            });
        }
        if retrieval.is_empty() {
            info!("no conversations found (customer={customer})");
            return Ok(AskOutcome::NoConversations { customer });
        }

        let context = format_context(&retrieval.results);
        let prompt = self.template.build(question, &context, history);
        debug!(
            "built prompt (customer={customer}, conversations={}, history_turns={}, prompt_len={})",
            context.len(),
            history.len(),
            prompt.len()
        );
        let generation = self
            .generator
            .generate(GenerationRequest::new(prompt))
            .await?;

        Ok(AskOutcome::Answered(Answer {
            text: generation.text,
            grounding: generation.grounding,
            citations: citations(&retrieval.results),
            context,
            retrieval,
        }))
    }

    /// Customer ids present in the archive.
    pub async fn list_customers(&self) -> Result<Vec<CustomerId>, AssistantError> {
        Ok(self.retriever.store().list_customers().await?)
    }
}
