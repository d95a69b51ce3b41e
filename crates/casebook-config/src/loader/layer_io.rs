//! IO helpers for reading config layers from disk.

use super::{ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
#[cfg(unix)]
use super::SYSTEM_CONFIG_PATH;
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Load a layer if the path exists; missing files are skipped.
pub(super) fn load_optional_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        debug!(
            "optional layer missing (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(None);
    }
    load_required_layer(source, path).map(Some)
}

/// Load and validate a layer that must exist.
pub(super) fn load_required_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<Value, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    let label = format!("{}({})", source.label(), path.display());
    schema::validate_layer_schema(&value, &label)?;
    Ok(value)
}

/// Default system config path on Unix; None elsewhere.
pub(super) fn default_system_config_path() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        Some(PathBuf::from(SYSTEM_CONFIG_PATH))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

/// Default user config path under the home directory.
pub(super) fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}
