use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// User-facing preferences, persisted as settings.toml.
///
/// The host owns this file; the core only reads a `Settings` value and is told
/// about changes through `ClipHistory::apply_settings`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub behavior: BehaviorSettings,
}

impl Settings {
    /// Returns the settings file path within the given data directory.
    pub fn path(data_dir: &Path) -> std::path::PathBuf {
        data_dir.join("settings.toml")
    }

    /// Loads settings from a TOML file. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Saves settings to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates values and returns the list of problems.
    /// Returns empty vec if the settings are valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.history.size == 0 {
            errors.push("history.size must be at least 1".to_string());
        }

        if self.display.preview_size < MIN_PREVIEW_SIZE {
            errors.push(format!(
                "display.preview_size must be at least {MIN_PREVIEW_SIZE}"
            ));
        }

        if self.display.topbar_preview_size < MIN_PREVIEW_SIZE {
            errors.push(format!(
                "display.topbar_preview_size must be at least {MIN_PREVIEW_SIZE}"
            ));
        }

        errors
    }

    /// Returns a copy with invalid values replaced by defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        let mut fixed = self.clone();

        if fixed.history.size == 0 {
            fixed.history.size = defaults.history.size;
        }
        if fixed.display.preview_size < MIN_PREVIEW_SIZE {
            fixed.display.preview_size = defaults.display.preview_size;
        }
        if fixed.display.topbar_preview_size < MIN_PREVIEW_SIZE {
            fixed.display.topbar_preview_size = defaults.display.topbar_preview_size;
        }

        fixed
    }
}

/// Shortest label that still shows one character before the ellipsis.
const MIN_PREVIEW_SIZE: usize = 4;

/// What gets recorded and kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum number of non-favorite entries.
    #[serde(default = "default_history_size")]
    pub size: usize,
    /// Persist favorites only; the rest of the history is lost on restart.
    #[serde(default)]
    pub cache_only_favorites: bool,
    /// Promote an entry to the newest position when it is copied again.
    #[serde(default = "default_true")]
    pub move_item_first: bool,
    /// Trim surrounding whitespace from captured text.
    #[serde(default)]
    pub strip_text: bool,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            size: default_history_size(),
            cache_only_favorites: false,
            move_item_first: true,
            strip_text: false,
        }
    }
}

/// Label lengths and prompts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_preview_size")]
    pub preview_size: usize,
    #[serde(default = "default_topbar_preview_size")]
    pub topbar_preview_size: usize,
    #[serde(default = "default_true")]
    pub notify_on_copy: bool,
    #[serde(default = "default_true")]
    pub confirm_clear: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            preview_size: default_preview_size(),
            topbar_preview_size: default_topbar_preview_size(),
            notify_on_copy: true,
            confirm_clear: true,
        }
    }
}

/// Runtime toggles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSettings {
    /// Ignore clipboard changes and hide the history.
    #[serde(default)]
    pub private_mode: bool,
    /// Ask the host to paste after an entry is activated.
    #[serde(default)]
    pub paste_on_selection: bool,
}

fn default_history_size() -> usize {
    15
}

fn default_preview_size() -> usize {
    30
}

fn default_topbar_preview_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Errors that can occur when loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(&Settings::path(temp.path())).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.history.size, 15);
        assert!(settings.display.confirm_clear);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = TempDir::new().unwrap();
        let path = Settings::path(temp.path());

        let mut settings = Settings::default();
        settings.history.size = 42;
        settings.history.cache_only_favorites = true;
        settings.behavior.private_mode = true;
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let settings: Settings = toml::from_str("[history]\nsize = 3\n").unwrap();
        assert_eq!(settings.history.size, 3);
        assert!(!settings.history.strip_text);
        assert!(settings.history.move_item_first);
        assert_eq!(settings.display, DisplaySettings::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = Settings::path(temp.path());
        std::fs::write(&path, "[history]\nsize = \"many\"\n").unwrap();

        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn invalid_values_are_reported_and_replaced() {
        let mut settings = Settings::default();
        settings.history.size = 0;
        settings.display.preview_size = 2;

        assert_eq!(settings.validate().len(), 2);

        let fixed = settings.with_defaults_for_invalid();
        assert!(fixed.validate().is_empty());
        assert_eq!(fixed.history.size, 15);
        assert_eq!(fixed.display.preview_size, 30);
    }
}
