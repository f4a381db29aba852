use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const TOKEN_ENV: &str = "SHORTCUT_API_TOKEN";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Persisted plugin settings. Field names match the editor plugin's `data.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub shortcut_api_key: String,
    /// Taken from `SHORTCUT_API_TOKEN` by [`Settings::load`]; never persisted.
    #[serde(skip)]
    pub token_override: Option<String>,
}

impl Settings {
    pub fn load() -> AppResult<Self> {
        let mut settings = Self::load_from(&settings_file_path()?)?;
        settings.token_override = env::var(TOKEN_ENV).ok();
        Ok(settings)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid settings file: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&settings_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write settings: {err}")))?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Token to send, preferring a non-blank override over the stored value.
    pub fn api_token(&self) -> String {
        self.token_override
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .unwrap_or(&self.shortcut_api_key)
            .to_string()
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    ProjectDirs::from("com", "shortcut-tickets", "shortcut-tickets")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| AppError::Configuration("unable to locate a config directory".to_string()))
}

pub fn settings_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load_from(&dir.path().join("settings.json")).expect("load");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn round_trips_through_plugin_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            shortcut_api_key: "abc123".to_string(),
            token_override: None,
        };

        settings.save_to(&path).expect("save");
        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"shortcutApiKey\": \"abc123\""));
        assert_eq!(Settings::load_from(&path).expect("load"), settings);
    }

    #[test]
    fn override_wins_unless_blank_and_is_never_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut settings = Settings {
            shortcut_api_key: "stored".to_string(),
            token_override: Some("from-env".to_string()),
        };
        assert_eq!(settings.api_token(), "from-env");

        settings.save_to(&path).expect("save");
        let raw = fs::read_to_string(&path).expect("read");
        assert!(!raw.contains("from-env"));
        assert_eq!(Settings::load_from(&path).expect("load").token_override, None);

        settings.token_override = Some("  ".to_string());
        assert_eq!(settings.api_token(), "stored");
        settings.token_override = None;
        assert_eq!(settings.api_token(), "stored");
    }

    #[test]
    fn invalid_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").expect("write");

        let err = Settings::load_from(&path).expect_err("invalid");
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
