//! Interactive chat input parsing.

use casebook_protocol::CustomerId;

/// One line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/customer N`
    Customer(CustomerId),
    /// `/history`
    History,
    /// `/quit` or `/exit`
    Quit,
    /// Anything that is not a slash command.
    Ask(String),
    /// Blank input.
    Empty,
    /// A slash command that could not be parsed.
    Invalid(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ChatCommand::Ask(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("customer"), Some(id), None) => match id.parse() {
                Ok(id) => ChatCommand::Customer(id),
                Err(_) => ChatCommand::Invalid(format!("invalid customer id: {id}")),
            },
            (Some("customer"), _, _) => ChatCommand::Invalid("usage: /customer <id>".to_string()),
            (Some("history"), None, _) => ChatCommand::History,
            (Some("quit" | "exit"), None, _) => ChatCommand::Quit,
            _ => ChatCommand::Invalid(format!("unknown command: {line}")),
        }
    }
}
