//! Public SDK surface for Casebook.
//!
//! This crate re-exports the building blocks, wires clients from config, and
//! renders answers for terminal front ends.

pub mod bootstrap;
pub mod chat;
pub mod command;
pub mod render;

/// Re-export for convenience.
pub use casebook_config as config;
pub use casebook_core as core;
/// Re-export for convenience.
pub use casebook_protocol as protocol;
pub use casebook_retrieval as retrieval;
pub use casebook_store as store;

pub use bootstrap::{build_assistant, connect_store};
pub use chat::{report, run_chat};
pub use command::ChatCommand;
pub use render::{RenderOptions, render_history, render_outcome};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
