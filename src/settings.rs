use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PennyError, Result};
use crate::reports::DEFAULT_WEEK_WINDOW;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub user_name: String,
    /// Trailing days shown in the spending trend.
    #[serde(default = "default_week_window")]
    pub week_window: u32,
}

fn default_week_window() -> u32 {
    DEFAULT_WEEK_WINDOW
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            user_name: String::new(),
            week_window: default_week_window(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("penny")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("penny")
}

/// Upper bound for `week_window`; a year of daily buckets.
pub const MAX_WEEK_WINDOW: u32 = 366;

fn parse_settings(content: &str) -> serde_json::Result<Settings> {
    let mut settings: Settings = serde_json::from_str(content)?;
    let window = settings.week_window.clamp(1, MAX_WEEK_WINDOW);
    if window != settings.week_window {
        tracing::warn!(
            "week_window {} out of range, using {window}",
            settings.week_window
        );
        settings.week_window = window;
    }
    Ok(settings)
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        parse_settings(&content).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PennyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            user_name: "Alice".to_string(),
            week_window: 14,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.user_name, "Alice");
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.week_window, 14);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.user_name.is_empty());
        assert_eq!(s.week_window, 7);
        assert!(s.data_dir.ends_with("penny"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "user_name": "Bob"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.week_window, 7);
        assert_eq!(s.user_name, "Bob");
    }

    #[test]
    fn test_week_window_is_clamped() {
        let huge = r#"{"data_dir": "/tmp/test", "week_window": 4000000000}"#;
        assert_eq!(parse_settings(huge).unwrap().week_window, MAX_WEEK_WINDOW);
        let zero = r#"{"data_dir": "/tmp/test", "week_window": 0}"#;
        assert_eq!(parse_settings(zero).unwrap().week_window, 1);
        let ok = r#"{"data_dir": "/tmp/test", "week_window": 30}"#;
        assert_eq!(parse_settings(ok).unwrap().week_window, 30);
    }

    #[test]
    fn test_shellexpand_keeps_missing_paths() {
        assert_eq!(shellexpand_path("/definitely/not/here"), "/definitely/not/here");
    }
}
