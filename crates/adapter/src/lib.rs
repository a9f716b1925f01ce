//! Adapters for the session engine's external collaborators
//!
//! The engine talks to storage only through the traits defined here:
//!
//! - [`HistoryRepository`]: finished-game records, with in-memory and
//!   JSON-lines file backends and a reactive [`RecordFeed`]
//! - [`SettingsRepository`]: immutable [`GameSettings`](types::GameSettings)
//!   snapshots, with in-memory and TOML file backends
//!
//! Backends are picked at startup from a [`StorageConfig`], usually built from
//! environment variables:
//!
//! - `STACKFALL_STORAGE`: `memory` or `jsonl` (default `jsonl`)
//! - `STACKFALL_HISTORY_PATH`: history file location
//! - `STACKFALL_SETTINGS_PATH`: settings file location
//! - `STACKFALL_DISABLED_PERSISTENCE`: set to "1" or "true" to keep everything in memory
//!
//! Saving a record goes through [`save_with_retry`], which retries failed
//! writes with exponential backoff according to a [`SavePolicy`].

pub mod config;
pub mod error;
pub mod history;
pub mod record;
pub mod retry;
pub mod settings;

pub use stackfall_core as core;
pub use stackfall_types as types;

pub use config::{open_history, open_settings, StorageBackend, StorageConfig};
pub use error::{PersistError, SettingsError};
pub use history::{HistoryRepository, JsonLinesHistory, MemoryHistory, RecordFeed, RecordFilter, RecordOrder};
pub use record::{current_timestamp_ms, record_from_snapshot, record_id, Fnv1aHasher};
pub use retry::{save_with_retry, SavePolicy};
pub use settings::{MemorySettings, SettingsRepository, TomlSettings};
