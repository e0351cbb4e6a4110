//! Process-wide configuration, read once at startup.
//!
//! Layers, lowest priority first:
//! 1. serde defaults on the optional fields
//! 2. `settings.json` in the working directory (optional)
//! 3. `TASKPILOT_*` environment variables (`.env` honoured via dotenvy)

use std::{fs, io, path::PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const ENV_PREFIX: &str = "TASKPILOT_";

/// Keys taken from the environment verbatim. `Env` would otherwise parse a
/// value like `123456` or `true` into a number or bool.
const STRING_KEYS: &[&str] = &[
    "database_path",
    "api_auth_token",
    "completion_api_key_file",
    "completion_base_url",
    "completion_model",
    "tcp_socket_binding",
];

fn default_binding() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_completion_timeout_secs() -> u64 {
    30
}

const fn default_max_page_size() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path of the redb save file. Created on first boot.
    pub database_path: PathBuf,
    /// Static bearer token every `/tasks` request must present.
    pub api_auth_token: String,
    /// File holding the completion API key.
    pub completion_api_key_file: PathBuf,
    #[serde(default = "default_completion_base_url")]
    pub completion_base_url: String,
    #[serde(default = "default_completion_model")]
    pub completion_model: String,
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
    #[serde(default = "default_binding")]
    pub tcp_socket_binding: String,
    #[serde(default = "default_port")]
    pub tcp_socket_port: u16,
    /// Upper bound applied to the `limit` query parameter of task listings.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("cannot read completion API key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Settings {
    /// Load `.env` (if any), then every layer.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::new()
            .merge(Json::file(SETTINGS_FILENAME))
            .merge(Env::prefixed(ENV_PREFIX).ignore(STRING_KEYS));

        for (key, value) in Env::prefixed(ENV_PREFIX).only(STRING_KEYS).iter() {
            figment = figment.merge(Serialized::default(key.as_str(), value));
        }
        figment
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_auth_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_auth_token",
                reason: "must not be blank".to_string(),
            });
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.completion_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "completion_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Read the completion API key. A missing, unreadable or blank file is fatal.
    pub fn read_completion_api_key(&self) -> Result<String, ConfigError> {
        let path = &self.completion_api_key_file;
        let key = fs::read_to_string(path).map_err(|source| ConfigError::KeyFile {
            path: path.clone(),
            source,
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "completion_api_key_file",
                reason: format!("{} is empty", path.display()),
            });
        }
        Ok(key.to_string())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}
