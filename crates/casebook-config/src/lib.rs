//! Configuration models and layered config loading.
//!
//! This crate owns the Casebook config schema, validation, layer merging, and
//! the lookup of secrets that are referenced by environment variable name.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
