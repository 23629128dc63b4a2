//! Client settings.
//!
//! Layered lowest to highest: built-in defaults, the settings file under
//! `~/.knowledge-inbox/`, `KNOWLEDGE_INBOX_*` environment variables, and
//! finally command-line overrides applied by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "KNOWLEDGE_INBOX_API_URL";
pub const ENV_QUERY_TIMEOUT: &str = "KNOWLEDGE_INBOX_QUERY_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "KNOWLEDGE_INBOX_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub query_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

pub fn get_base_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".knowledge-inbox")
}

pub fn get_settings_path() -> PathBuf {
    get_base_dir().join("settings.json")
}

impl Settings {
    /// Defaults overlaid with the settings file (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(get_settings_path);
        let mut settings = Self::from_file(&path)?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read a settings file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            AppError::Config(format!("Invalid settings file {}: {e}", path.display()))
        })?;
        log::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_QUERY_TIMEOUT) {
            self.query_timeout_secs = parse_secs(ENV_QUERY_TIMEOUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = parse_secs(ENV_REQUEST_TIMEOUT, &raw)?;
        }
        Ok(())
    }

    /// Check invariants and strip trailing slashes from the base URL.
    pub fn validate(&mut self) -> AppResult<()> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&trimmed)
            .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {e}", trimmed)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Config(format!(
                "API base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.query_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(AppError::Config("Timeouts must be greater than zero".into()));
        }
        self.api_base_url = trimmed;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> AppResult<u64> {
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {key} '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.api_base_url, "http://localhost:3000");
        assert_eq!(s.query_timeout_secs, 60);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::from_file(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api_base_url": "https://inbox.example.com/"}"#).unwrap();
        let mut s = Settings::from_file(&path).unwrap();
        s.validate().unwrap();
        assert_eq!(s.api_base_url, "https://inbox.example.com");
        assert_eq!(s.query_timeout_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Settings::from_file(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut s = Settings::default();
        s.apply_env(env_of(&[
            (ENV_API_URL, "http://10.0.0.5:8000"),
            (ENV_QUERY_TIMEOUT, "90"),
        ]))
        .unwrap();
        assert_eq!(s.api_base_url, "http://10.0.0.5:8000");
        assert_eq!(s.query_timeout_secs, 90);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn test_bad_env_timeout() {
        let mut s = Settings::default();
        let result = s.apply_env(env_of(&[(ENV_REQUEST_TIMEOUT, "soon")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut s = Settings { api_base_url: "ftp://files".into(), ..Settings::default() };
        assert!(s.validate().is_err());

        let mut s = Settings { query_timeout_secs: 0, ..Settings::default() };
        assert!(s.validate().is_err());

        let mut s = Settings { api_base_url: "not a url".into(), ..Settings::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings { query_timeout_secs: 120, ..Settings::default() };
        s.save(&path).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap(), s);
    }
}
