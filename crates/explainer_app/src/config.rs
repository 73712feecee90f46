use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use explainer_core::DEFAULT_INSTRUCTIONS;
use explainer_engine::{GenerateSettings, FETCH_ALL_MAX_RETRIES, REGENERATE_MAX_RETRIES};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "explainer.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub model: String,
    pub format_json: bool,
    pub fetch_all_max_retries: u32,
    pub regenerate_max_retries: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    /// Replaces the built-in instruction template when set.
    pub instructions_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generate = GenerateSettings::default();
        Self {
            endpoint: generate.endpoint,
            model: generate.model,
            format_json: generate.format_json,
            fetch_all_max_retries: FETCH_ALL_MAX_RETRIES,
            regenerate_max_retries: REGENERATE_MAX_RETRIES,
            connect_timeout_secs: generate.connect_timeout.as_secs(),
            request_timeout_secs: generate.request_timeout.as_secs(),
            max_response_bytes: generate.max_bytes,
            instructions_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn generate_settings(&self) -> GenerateSettings {
        GenerateSettings {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            format_json: self.format_json,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
        }
    }

    pub fn instructions(&self) -> Result<String, ConfigError> {
        match &self.instructions_path {
            Some(path) => fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            }),
            None => Ok(DEFAULT_INSTRUCTIONS.to_string()),
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

/// Load the config from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
///
/// An explicit path must exist; the default file is optional. Also returns
/// the file that was read, `None` when running on defaults. Loading happens
/// before the logger is up, so the caller reports the source.
pub fn load(path: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>), ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            return Ok((AppConfig::default(), None));
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };

    let config = parse(&content).map_err(|message| ConfigError::Parse {
        path: path.clone(),
        message,
    })?;
    Ok((config, Some(path)))
}

fn parse(content: &str) -> Result<AppConfig, String> {
    ron::from_str(content).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use log::LevelFilter;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::{load, parse, AppConfig, ConfigError};

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let config = parse(r#"(model: "mistral", fetch_all_max_retries: 7)"#).unwrap();
        assert_eq!(config.model, "mistral");
        assert_eq!(config.fetch_all_max_retries, 7);
        assert_eq!(config.regenerate_max_retries, 3);
        assert_eq!(config.endpoint, "http://localhost:11434/api/generate");
    }

    #[test]
    fn settings_carry_timeouts_in_seconds() {
        let config = AppConfig {
            request_timeout_secs: 12,
            ..AppConfig::default()
        };
        let settings = config.generate_settings();
        assert_eq!(settings.request_timeout.as_secs(), 12);
        assert_eq!(settings.model, "llama3");
        assert!(settings.format_json);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("nope.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("explainer.ron");
        fs::write(&path, r#"(log_level: "debug", format_json: false)"#).unwrap();

        let (config, source) = load(Some(&path)).unwrap();
        assert_eq!(source, Some(path));
        assert!(!config.format_json);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn garbage_file_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("explainer.ron");
        fs::write(&path, "model = llama3").unwrap();

        assert!(matches!(
            load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn instructions_come_from_file_when_configured() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("prompt.txt");
        fs::write(&path, "Explain briefly.").unwrap();

        let config = AppConfig {
            instructions_path: Some(path),
            ..AppConfig::default()
        };
        assert_eq!(config.instructions().unwrap(), "Explain briefly.");

        let missing = AppConfig {
            instructions_path: Some(PathBuf::from("/definitely/not/here.txt")),
            ..AppConfig::default()
        };
        assert!(missing.instructions().is_err());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = AppConfig {
            log_level: "loud".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.log_level(), Err(ConfigError::LogLevel(_))));
    }
}
