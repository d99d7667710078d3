use relay::ModelConfig;
use std::{env, net::SocketAddr};
use thiserror::Error;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const LISTEN_ADDR_VAR: &str = "LEARNING_ASSISTANT_LISTEN_ADDR";
pub const API_BASE_VAR: &str = "LEARNING_ASSISTANT_API_BASE";
pub const MODEL_VAR: &str = "LEARNING_ASSISTANT_MODEL";
pub const TEMPERATURE_VAR: &str = "LEARNING_ASSISTANT_TEMPERATURE";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Expected env var: {0}")]
    Missing(&'static str),
    #[error("Invalid value for env var {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// No Debug: holds the API key.
pub struct Config {
    pub api_key: String,
    pub api_base: Option<String>,
    pub listen_addr: SocketAddr,
    pub model: ModelConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;

        let listen_addr = lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr: SocketAddr = listen_addr.parse().map_err(|_| ConfigError::Invalid {
            name: LISTEN_ADDR_VAR,
            value: listen_addr.clone(),
        })?;

        let mut model = ModelConfig::default();
        if let Some(name) = lookup(MODEL_VAR) {
            model.model = name;
        }
        if let Some(temperature) = lookup(TEMPERATURE_VAR) {
            model.temperature = temperature.parse().map_err(|_| ConfigError::Invalid {
                name: TEMPERATURE_VAR,
                value: temperature.clone(),
            })?;
        }

        Ok(Self {
            api_key,
            api_base: lookup(API_BASE_VAR),
            listen_addr,
            model,
        })
    }
}
