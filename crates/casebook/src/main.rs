//! Command-line front end for asking questions about a customer's support history.

use anyhow::{Context, bail};
use casebook::config::{CasebookConfig, LayeredConfigOptions};
use casebook::core::Assistant;
use casebook::protocol::CustomerId;
use casebook::retrieval::RetrievalMode;
use casebook::store::ConversationStore;
use casebook::{RenderOptions, build_assistant, connect_store, render_outcome, report, run_chat};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::io;
use std::path::PathBuf;
use tokio::io::BufReader;

/// Command-line options.
#[derive(Parser)]
#[command(name = "casebook", version, about)]
struct Cli {
    /// Extra casebook.json5 layer applied over the discovered config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the retrieval mode
    #[arg(long, global = true, value_enum)]
    mode: Option<ModeArg>,
    /// Override the number of conversations retrieved
    #[arg(long, global = true)]
    limit: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List customer ids present in the archive
    Customers,
    /// Ask a single question
    Ask {
        /// Customer whose history is searched
        #[arg(long)]
        customer: CustomerId,
        /// Print the context given to the model
        #[arg(long)]
        show_context: bool,
        /// Print the raw retrieved records
        #[arg(long)]
        show_raw: bool,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Start an interactive session
    Chat {
        /// Initially selected customer
        #[arg(long)]
        customer: Option<CustomerId>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Vector,
    Text,
    Hybrid,
}

impl From<ModeArg> for RetrievalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Vector => RetrievalMode::Vector,
            ModeArg::Text => RetrievalMode::Text,
            ModeArg::Hybrid => RetrievalMode::Hybrid,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    casebook::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Customers => {
            // Listing needs only the store, not the model API keys.
            let store = connect_store(&config).await?;
            let customers = store
                .list_customers()
                .await
                .context("failed to list customers")?;
            for customer in customers {
                println!("{customer}");
            }
        }
        Command::Ask {
            customer,
            show_context,
            show_raw,
            json,
            question,
        } => {
            let assistant = configured_assistant(&config, cli.mode, cli.limit).await?;
            let question = question.join(" ");
            match assistant.ask(customer, &question, &[]).await {
                Ok(outcome) if json => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                Ok(outcome) => {
                    let render = RenderOptions {
                        show_context,
                        show_raw,
                    };
                    print!("{}", render_outcome(&outcome, render));
                }
                Err(err) => return Err(report(err)),
            }
        }
        Command::Chat { customer } => {
            let assistant = configured_assistant(&config, cli.mode, cli.limit).await?;
            let input = BufReader::new(tokio::io::stdin());
            run_chat(&assistant, customer, input, &mut io::stdout()).await?;
        }
    }
    Ok(())
}

/// Build the assistant and apply command-line retrieval overrides.
async fn configured_assistant(
    config: &CasebookConfig,
    mode: Option<ModeArg>,
    limit: Option<usize>,
) -> anyhow::Result<Assistant> {
    let assistant = build_assistant(config).await?;
    let mut options = *assistant.options();
    if let Some(mode) = mode {
        options = options.with_mode(mode.into());
    }
    if let Some(limit) = limit {
        if limit == 0 {
            bail!("--limit must be greater than zero");
        }
        options = options.with_limit(limit);
    }
    Ok(assistant.with_options(options))
}

fn load_config(cli: &Cli) -> anyhow::Result<CasebookConfig> {
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut layer_options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        info!("adding runtime config layer: {}", path.display());
        layer_options = layer_options.with_runtime_path(path);
    }
    let layered = CasebookConfig::load_layered_with_options(layer_options)
        .context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}
