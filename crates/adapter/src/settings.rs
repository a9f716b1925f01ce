//! Settings persistence using TOML
//!
//! Stores settings in the platform config dir (`settings.toml`). Consumers read
//! immutable [`GameSettings`] values and can watch for replacements.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tokio::sync::watch;

use crate::error::SettingsError;
use crate::types::GameSettings;

pub trait SettingsRepository: Send + Sync {
    /// Current settings
    fn get(&self) -> GameSettings;

    fn observe(&self) -> watch::Receiver<GameSettings>;

    /// Validate and replace the settings; observers see the new value
    fn update(&self, settings: GameSettings) -> Result<(), SettingsError>;
}

/// Project directories for config and data files
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "stackfall", "stackfall")
}

fn validated(settings: GameSettings) -> Result<GameSettings, SettingsError> {
    settings.validate().map_err(SettingsError::Invalid)?;
    Ok(settings)
}

/// Settings that live only as long as the process
#[derive(Debug)]
pub struct MemorySettings {
    current: watch::Sender<GameSettings>,
}

impl MemorySettings {
    pub fn new(settings: GameSettings) -> Self {
        let (current, _) = watch::channel(settings);
        Self { current }
    }
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self::new(GameSettings::default())
    }
}

impl SettingsRepository for MemorySettings {
    fn get(&self) -> GameSettings {
        self.current.borrow().clone()
    }

    fn observe(&self) -> watch::Receiver<GameSettings> {
        self.current.subscribe()
    }

    fn update(&self, settings: GameSettings) -> Result<(), SettingsError> {
        self.current.send_replace(validated(settings)?);
        Ok(())
    }
}

/// Settings backed by a TOML file
#[derive(Debug)]
pub struct TomlSettings {
    path: PathBuf,
    current: watch::Sender<GameSettings>,
}

impl TomlSettings {
    /// Default file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load settings from `path`, or start from defaults if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(contents) => validated(toml::from_str(&contents)?)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => GameSettings::default(),
            Err(e) => return Err(e.into()),
        };
        let (current, _) = watch::channel(settings);
        Ok(Self { path, current })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, settings: &GameSettings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let contents = toml::to_string_pretty(settings)?;
        // Write then rename so readers never see a half-written file.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsRepository for TomlSettings {
    fn get(&self) -> GameSettings {
        self.current.borrow().clone()
    }

    fn observe(&self) -> watch::Receiver<GameSettings> {
        self.current.subscribe()
    }

    fn update(&self, settings: GameSettings) -> Result<(), SettingsError> {
        let settings = validated(settings)?;
        self.write(&settings)?;
        self.current.send_replace(settings);
        Ok(())
    }
}
