//! Settings and file locations for the CLI

use shared::settings::{AppSettings, EnginePreference};
use shared::AssistantError;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "ki_assistant";

/// Per-user config directory, e.g. `~/.config/ki_assistant`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

pub fn log_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("ki_assistant.log"))
}

pub fn load_settings_from(path: &Path) -> Result<AppSettings, AssistantError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AssistantError::Settings(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| AssistantError::Settings(format!("{}: {}", path.display(), e)))
}

/// Load settings from disk or return defaults. The flag tells whether a
/// settings file was found.
pub fn load_settings_or_default() -> (AppSettings, bool) {
    if let Some(path) = config_path() {
        if path.exists() {
            match load_settings_from(&path) {
                Ok(settings) => return (settings, true),
                Err(e) => tracing::warn!("ignoring unreadable settings: {}", e),
            }
        }
    }
    (AppSettings::default(), false)
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), AssistantError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AssistantError::Settings(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| AssistantError::Settings(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| AssistantError::Settings(e.to_string()))
}

/// Save settings to disk, best effort
pub fn save_settings(settings: &AppSettings) {
    if let Some(path) = config_path() {
        if let Err(e) = save_settings_to(&path, settings) {
            tracing::warn!("could not save settings: {}", e);
        }
    }
}

/// Apply `KI_ASSISTANT_ENGINE` and `OLLAMA_BASE_URL` from the environment
pub fn apply_env_overrides(settings: &mut AppSettings) {
    apply_overrides(
        settings,
        std::env::var("KI_ASSISTANT_ENGINE").ok(),
        std::env::var("OLLAMA_BASE_URL").ok(),
    );
}

fn apply_overrides(settings: &mut AppSettings, engine: Option<String>, base_url: Option<String>) {
    if let Some(value) = engine {
        match EnginePreference::parse(&value) {
            Some(pref) => settings.engine.preference = pref,
            None => tracing::warn!("unknown KI_ASSISTANT_ENGINE value '{}'", value),
        }
    }
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        settings.engine.base_url = Some(url);
    }
}
