//! Credential settings stored in TOML files.
//!
//! Settings live in a directory chosen, in order, by `--config-dir`, the
//! `ID3SPOT_CONFIG_DIR` environment variable, or the OS-standard config
//! directory:
//! - Windows: %APPDATA%\id3spot\
//! - macOS: ~/Library/Application Support/id3spot/
//! - Linux: ~/.config/id3spot/
//!
//! `settings.toml` is required. `settings.override.toml` is optional and is
//! merged over it key by key; keep the override out of version control.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the required settings file
pub const SETTINGS_FILE: &str = "settings.toml";

/// Name of the optional override file
pub const OVERRIDE_FILE: &str = "settings.override.toml";

/// Loaded settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Catalog service credentials
    pub spotify: SpotifyCredentials,
}

/// Client-credentials pair for the catalog service
#[derive(Clone, Deserialize)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the default settings directory
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("id3spot"))
}

/// Load settings from `dir`, or from [`config_dir`] when `dir` is `None`.
///
/// Unlike most loaders this never falls back to defaults: without
/// credentials nothing can be looked up, so the caller should abort.
pub fn load(dir: Option<&Path>) -> Result<Settings, ConfigError> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => config_dir().ok_or(ConfigError::NoConfigDir)?,
    };
    load_from(&dir)
}

/// Load `settings.toml` from `dir` and apply `settings.override.toml` if present
pub fn load_from(dir: &Path) -> Result<Settings, ConfigError> {
    let base_path = dir.join(SETTINGS_FILE);
    let mut table = read_table(&base_path)?;

    let override_path = dir.join(OVERRIDE_FILE);
    if override_path.is_file() {
        let overrides = read_table(&override_path)?;
        merge_tables(&mut table, overrides);
        tracing::debug!("Applied settings override from {:?}", override_path);
    }

    let settings: Settings = toml::Value::Table(table)
        .try_into()
        .map_err(|e| ConfigError::Parse(base_path.clone(), e))?;

    if settings.spotify.client_id.trim().is_empty() {
        return Err(ConfigError::MissingKey("spotify.client_id"));
    }
    if settings.spotify.client_secret.trim().is_empty() {
        return Err(ConfigError::MissingKey("spotify.client_secret"));
    }

    tracing::debug!("Loaded settings from {:?}", base_path);
    Ok(settings)
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Recursively merge `overrides` into `base`; scalars in `overrides` win.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read settings from {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse settings in {0}: {1}")]
    Parse(PathBuf, toml::de::Error),

    #[error("Missing required setting `{0}`")]
    MissingKey(&'static str),
}

// ============================================================================
// Tests
// ============================================================================
