//! Layered configuration loader.
//!
//! Discovers configuration layers (system/user/project/cwd/runtime), validates
//! each against the schema, merges them in precedence order, and produces the
//! effective `CasebookConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;


use crate::{CasebookConfig, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "casebook.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".casebook";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
/// Default system config path on Unix.
const SYSTEM_CONFIG_PATH: &str = "/etc/casebook/casebook.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: CasebookConfig,
    /// Metadata for each layer that contributed.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// System-wide configuration.
    System,
    /// User-specific configuration.
    User,
    /// Project root configuration.
    Project,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

impl ConfigLayerSource {
    fn label(self) -> &'static str {
        match self {
            ConfigLayerSource::System => "system",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Project => "project",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Runtime => "runtime",
        }
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find project and cwd layers.
    pub cwd: PathBuf,
    /// Optional system config path (defaults to `/etc/casebook/casebook.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Optional user config path (defaults to `~/.casebook/casebook.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override config paths applied last; these must exist.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Add a runtime override config path that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl CasebookConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): system, user, project, cwd, runtime.
    /// The project and cwd layers collapse into one when they are the same file.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        debug!("normalized cwd for config load: {}", cwd.display());

        let mut candidates: Vec<(ConfigLayerSource, PathBuf)> = Vec::new();
        if let Some(path) = options.system_config_path {
            candidates.push((ConfigLayerSource::System, path));
        }
        if let Some(path) = options.user_config_path {
            candidates.push((ConfigLayerSource::User, path));
        }
        match utils::find_project_root(&cwd, &options.project_root_markers) {
            Some(root) => {
                debug!("resolved project root: {}", root.display());
                candidates.push((ConfigLayerSource::Project, root.join(DEFAULT_CONFIG_FILE)));
            }
            None => debug!("project root not found; skipping project layer"),
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));

        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        for (source, path) in candidates {
            if !seen_paths.insert(utils::unique_path(&path)) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            if let Some(value) = layer_io::load_optional_layer(source, &path)? {
                merge::merge_json_values(&mut merged, &value);
                layers.push(ConfigLayer { source, path });
            }
        }

        for path in options.runtime_paths {
            let value = layer_io::load_required_layer(ConfigLayerSource::Runtime, &path)?;
            merge::merge_json_values(&mut merged, &value);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Runtime,
                path,
            });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.limit == 0 {
            return Err(invalid("retrieval.limit", "must be greater than zero"));
        }
        if (self.store.num_candidates as usize) < self.retrieval.limit {
            return Err(invalid(
                "store.num_candidates",
                "must be at least retrieval.limit",
            ));
        }
        if self.generation.response_modalities.is_empty() {
            return Err(invalid(
                "generation.response_modalities",
                "must list at least one modality",
            ));
        }
        if self.embedding.dimensions == Some(0) {
            return Err(invalid("embedding.dimensions", "must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn config_from_value(value: Value, label: &str) -> Result<CasebookConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: CasebookConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
