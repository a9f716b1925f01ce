//! Storage selection

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{PersistError, SettingsError};
use crate::history::{HistoryRepository, JsonLinesHistory, MemoryHistory};
use crate::settings::{project_dirs, MemorySettings, SettingsRepository, TomlSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    JsonLines { path: PathBuf },
}

/// Where history and settings are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// TOML settings file; in-memory settings when `None`
    pub settings_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl StorageConfig {
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            settings_path: None,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a variable lookup.
    ///
    /// - `STACKFALL_DISABLED_PERSISTENCE`: "1"/"true" forces memory storage
    /// - `STACKFALL_STORAGE`: "memory" or "jsonl" (default "jsonl")
    /// - `STACKFALL_HISTORY_PATH`: history file (default `<data dir>/history.jsonl`)
    /// - `STACKFALL_SETTINGS_PATH`: settings file (default `<config dir>/settings.toml`)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        let disabled = non_empty("STACKFALL_DISABLED_PERSISTENCE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        if disabled {
            return Self::memory();
        }

        let dirs = project_dirs();
        let history_path = non_empty("STACKFALL_HISTORY_PATH")
            .map(PathBuf::from)
            .or_else(|| dirs.as_ref().map(|d| d.data_dir().join("history.jsonl")));
        let settings_path = non_empty("STACKFALL_SETTINGS_PATH")
            .map(PathBuf::from)
            .or_else(|| dirs.as_ref().map(|d| d.config_dir().join("settings.toml")));

        let wants_memory = non_empty("STACKFALL_STORAGE")
            .map(|v| v.eq_ignore_ascii_case("memory"))
            .unwrap_or(false);

        let backend = match history_path {
            Some(path) if !wants_memory => StorageBackend::JsonLines { path },
            _ => StorageBackend::Memory,
        };

        Self {
            backend,
            settings_path,
        }
    }
}

/// Open the configured history backend
pub fn open_history(config: &StorageConfig) -> Result<Arc<dyn HistoryRepository>, PersistError> {
    Ok(match &config.backend {
        StorageBackend::Memory => Arc::new(MemoryHistory::new()),
        StorageBackend::JsonLines { path } => Arc::new(JsonLinesHistory::open(path.clone())?),
    })
}

/// Open the configured settings backend
pub fn open_settings(config: &StorageConfig) -> Result<Arc<dyn SettingsRepository>, SettingsError> {
    Ok(match &config.settings_path {
        None => Arc::new(MemorySettings::default()),
        Some(path) => Arc::new(TomlSettings::open(path.clone())?),
    })
}
