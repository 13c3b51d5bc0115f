//! Engine configuration
//!
//! A JSON file in the data directory. Every field has a default, so a
//! missing or partial file is fine; a malformed one is logged and ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::DomainResult;
use crate::repository::DEFAULT_KEY_PREFIX;

pub const CONFIG_FILE_NAME: &str = "fridge_config.json";
pub const DEFAULT_REMOTE_TABLE: &str = "fridge_app_state";
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

pub const ENV_REMOTE_URL: &str = "OUR_FRIDGE_REMOTE_URL";
pub const ENV_REMOTE_KEY: &str = "OUR_FRIDGE_REMOTE_KEY";

fn default_table() -> String {
    DEFAULT_REMOTE_TABLE.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

/// PostgREST endpoint holding one state row per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub url: String,
    /// Project (anon) key, sent as `apikey` and as the bearer when the user has no token
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            table: default_table(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Put removed inventory items back on the shopping list
    #[serde(default)]
    pub restock_on_remove: bool,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Replaces the built-in recipes when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_catalog: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            restock_on_remove: false,
            key_prefix: default_key_prefix(),
            recipe_catalog: None,
        }
    }
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Remote section with a usable URL and key, if any
    pub fn active_remote(&self) -> Option<&RemoteConfig> {
        self.remote
            .as_ref()
            .filter(|r| !r.url.trim().is_empty() && !r.api_key.trim().is_empty())
    }
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file; never fails, falls back to defaults
pub fn load_config(data_dir: &Path) -> EngineConfig {
    let path = config_path(data_dir);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return EngineConfig::default(),
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            return EngineConfig::default();
        }
    };

    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", path.display(), e);
            EngineConfig::default()
        }
    }
}

pub fn save_config(data_dir: &Path, config: &EngineConfig) -> DomainResult<()> {
    std::fs::create_dir_all(data_dir)?;
    let text = serde_json::to_string_pretty(config)?;
    std::fs::write(config_path(data_dir), text)?;
    Ok(())
}

/// Apply `OUR_FRIDGE_REMOTE_*` overrides from `lookup`
pub fn apply_env_overrides<F>(config: &mut EngineConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup(ENV_REMOTE_URL).filter(|v| !v.is_empty());
    let key = lookup(ENV_REMOTE_KEY).filter(|v| !v.is_empty());
    if url.is_none() && key.is_none() {
        return;
    }

    let remote = config
        .remote
        .get_or_insert_with(|| RemoteConfig::new(String::new(), String::new()));
    if let Some(url) = url {
        remote.url = url;
    }
    if let Some(key) = key {
        remote.api_key = key;
    }
}

/// `load_config` plus overrides from the process environment
pub fn load_config_with_env(data_dir: &Path) -> EngineConfig {
    let mut config = load_config(data_dir);
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}
