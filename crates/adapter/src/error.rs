use thiserror::Error;

/// History persistence failures
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history record encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Settings persistence failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}
