//! Interactive question loop.

use crate::command::ChatCommand;
use crate::render::{RenderOptions, render_history, render_outcome};
use anyhow::Context;
use casebook_core::{Assistant, AssistantError, Session};
use casebook_protocol::CustomerId;
use log::info;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Map an assistant error to the message shown to the user.
pub fn report(err: AssistantError) -> anyhow::Error {
    match err {
        AssistantError::Generation(err) => anyhow::anyhow!("Error generating response: {err}"),
        other => anyhow::Error::new(other),
    }
}

/// Read commands and questions from `input` until `/quit` or end of input.
pub async fn run_chat<R, W>(
    assistant: &Assistant,
    customer: Option<CustomerId>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = Session::new();
    if let Some(customer) = customer {
        session.select_customer(customer);
    }
    info!("chat session started (session_id={})", session.id());
    writeln!(out, "Commands: /customer <id>, /history, /quit")?;

    let mut lines = input.lines();
    loop {
        match session.customer() {
            Some(customer) => write!(out, "[customer {customer}] > ")?,
            None => write!(out, "> ")?,
        }
        out.flush().context("failed to flush output")?;

        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };
        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::History => write!(out, "{}", render_history(session.turns()))?,
            ChatCommand::Customer(customer) => {
                session.select_customer(customer);
                writeln!(out, "Selected customer {customer}.")?;
            }
            ChatCommand::Invalid(message) => writeln!(out, "{message}")?,
            ChatCommand::Ask(question) => match session.ask(assistant, &question).await {
                Ok(outcome) => write!(
                    out,
                    "{}",
                    render_outcome(&outcome, RenderOptions::default())
                )?,
                Err(AssistantError::NoCustomerSelected) => {
                    writeln!(out, "Select a customer first with /customer <id>.")?;
                }
                Err(err) => writeln!(out, "{}", report(err))?,
            },
        }
    }
    Ok(())
}
