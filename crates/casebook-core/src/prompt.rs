//! Generation prompt assembly.

use casebook_config::PromptConfig;
use casebook_protocol::{ConversationTurn, FormattedConversation};

/// Fixed-shape prompt with configurable framing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    preamble: String,
    no_context_instruction: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl From<&PromptConfig> for PromptTemplate {
    fn from(config: &PromptConfig) -> Self {
        Self::new(&config.preamble, &config.no_context_instruction)
    }
}

impl PromptTemplate {
    pub fn new(preamble: impl Into<String>, no_context_instruction: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            no_context_instruction: no_context_instruction.into(),
        }
    }

    /// Build the prompt for `question` over `context` and prior `history`.
    pub fn build(
        &self,
        question: &str,
        context: &[FormattedConversation],
        history: &[ConversationTurn],
    ) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.preamble.trim_end());
        prompt.push('\n');
        prompt.push_str(&render_context(context));
        prompt.push_str("\n\n");

        if !history.is_empty() {
            prompt.push_str("Previous conversation:\n");
            for turn in history {
                prompt.push_str(turn.role.label());
                prompt.push_str(": ");
                prompt.push_str(&turn.content);
                prompt.push('\n');
            }
            prompt.push('\n');
        }

        prompt.push_str("Current question: ");
        prompt.push_str(question);
        prompt.push_str("\n\n");
        prompt.push_str(self.no_context_instruction.trim_end());
        prompt
    }
}

/// Pretty JSON with two-space indentation; non-ASCII text is kept verbatim.
fn render_context(context: &[FormattedConversation]) -> String {
    serde_json::to_string_pretty(context).unwrap_or_else(|_| "[]".to_string())
}
