//! Configuration file resolution and loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Flags and environment variables are handled by clap in the server binary.
//! This module covers the TOML layer.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locate the config file to load.
///
/// An explicit path must exist. Without one, the platform default
/// (`~/.config/cleanlog/config.toml` on Linux, then `/etc/cleanlog/config.toml`)
/// is used when present; otherwise no file is loaded.
pub fn resolve_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let user_config = dirs::config_dir().map(|d| d.join("cleanlog").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/cleanlog/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }
    }

    debug!("No config file found, using flags, environment and defaults");
    Ok(None)
}

/// Parse a TOML file into `T`
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let parsed = toml::from_str::<T>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(parsed)
}

/// Resolve and load the config file, falling back to `T::default()` when none exists
pub fn load_optional_toml<T: DeserializeOwned + Default>(explicit: Option<&Path>) -> Result<T> {
    match resolve_config_file(explicit)? {
        Some(path) => load_toml_file(&path),
        None => Ok(T::default()),
    }
}
