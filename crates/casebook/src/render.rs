//! Plain-text rendering of assistant results.

use casebook_core::{Answer, AskOutcome};
use casebook_protocol::ConversationTurn;
use std::fmt::Write;

/// Optional sections printed after an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Print the context given to the model as JSON.
    pub show_context: bool,
    /// Print the raw retrieved records as JSON.
    pub show_raw: bool,
}

/// Render an ask outcome for the terminal.
pub fn render_outcome(outcome: &AskOutcome, options: RenderOptions) -> String {
    match outcome {
        AskOutcome::Answered(answer) => render_answer(answer, options),
        AskOutcome::NoConversations { customer } => {
            format!("No conversations found for customer {customer}.\n")
        }
        AskOutcome::BelowMinScore { customer, filtered } => format!(
            "No conversations for customer {customer} reached the minimum score ({filtered} below it).\n"
        ),
    }
}

fn render_answer(answer: &Answer, options: RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(answer.text.trim_end());
    out.push('\n');

    if !answer.citations.is_empty() {
        out.push_str("\nSources:\n");
        for (idx, citation) in answer.citations.iter().enumerate() {
            let _ = writeln!(
                out,
                "  [{}] {} ({}, {} score {:.3})",
                idx + 1,
                citation.conversation_id,
                citation.timestamp,
                citation.path,
                citation.score
            );
        }
    }

    if let Some(grounding) = &answer.grounding {
        if !grounding.web_search_queries.is_empty() {
            let _ = writeln!(
                out,
                "\nWeb searches: {}",
                grounding.web_search_queries.join(", ")
            );
        }
        for source in &grounding.sources {
            match &source.title {
                Some(title) => {
                    let _ = writeln!(out, "  {title}: {}", source.uri);
                }
                None => {
                    let _ = writeln!(out, "  {}", source.uri);
                }
            }
        }
        if let Some(entry_point) = &grounding.search_entry_point {
            out.push_str("\nSearch entry point:\n");
            out.push_str(entry_point.trim_end());
            out.push('\n');
        }
    }

    for failure in &answer.retrieval.degradations {
        let _ = writeln!(out, "\nwarning: {failure}");
    }

    if options.show_context {
        out.push_str("\nContext:\n");
        out.push_str(&to_pretty_json(&answer.context));
        out.push('\n');
    }
    if options.show_raw {
        out.push_str("\nRetrieved records:\n");
        out.push_str(&to_pretty_json(&answer.retrieval.results));
        out.push('\n');
    }
    out
}

/// Render a session transcript.
pub fn render_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return "No history yet.\n".to_string();
    }
    let mut out = String::new();
    for turn in turns {
        let _ = writeln!(out, "{}: {}", turn.role.label(), turn.content);
    }
    out
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}
