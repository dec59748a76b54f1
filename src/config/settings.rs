//! TOML-based configuration for metricize.
//!
//! Supports a config file (metricize.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! environment = "production"
//! log_level = "debug"
//! metadata_path = "${DATA_DIR}/metadata.json"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "METRICIZE_CONFIG";

/// Variable overriding the configured environment.
pub const ENVIRONMENT_ENV_VAR: &str = "METRICIZE_ENV";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unknown environment: {0} (expected 'production' or 'development')")]
    UnknownEnvironment(String),
}

/// Deployment environment of the hosting process.
///
/// Selects the bucketing and filtering applied when a metric is turned back
/// into a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Parse an environment name. `prod` and `dev` are accepted as aliases.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(Environment::Production),
            "development" | "dev" => Some(Environment::Development),
            _ => None,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub environment: Environment,

    /// Default tracing filter, used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Metadata JSON file (supports ${ENV_VAR} expansion).
    pub metadata_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: "info".to_string(),
            metadata_path: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations, then apply
    /// environment overrides.
    ///
    /// Searches in order:
    /// 1. Environment variable `METRICIZE_CONFIG`
    /// 2. `./metricize.toml`
    /// 3. `~/.config/metricize/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        Self::locate()?.with_env_overrides()
    }

    fn locate() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("metricize.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("metricize").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Apply `METRICIZE_ENV`, if set.
    pub fn with_env_overrides(mut self) -> Result<Self, SettingsError> {
        if let Ok(value) = env::var(ENVIRONMENT_ENV_VAR) {
            self.environment =
                Environment::from_str(&value).ok_or(SettingsError::UnknownEnvironment(value))?;
        }
        Ok(self)
    }

    /// The metadata path with environment variables expanded.
    pub fn metadata_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.metadata_path
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // closing brace
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
