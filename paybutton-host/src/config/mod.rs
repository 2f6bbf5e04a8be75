//! Configuration module for paybutton-host.
//!
//! Loads the payment request, collaborator endpoints and controller
//! settings from a TOML file and applies CLI overrides.

pub mod file;

use crate::config::file::FileConfig;
use paybutton_core::config::{ControllerSettings, PaymentRequestConfig};
use paybutton_sdk::objects::CoinType;
use paybutton_sdk::config::Endpoints;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub request: PaymentRequestConfig,
    pub endpoints: Endpoints,
    pub settings: ControllerSettings,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    watch_override: bool,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, watch_override: bool) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            watch_override,
        }
    }

    /// Read, override and validate the configuration file.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.parse(&config_content)
    }

    fn parse(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if self.watch_override {
            file_config.request.watch_address = true;
        }

        validate(&file_config.request)?;

        Ok(LoadedConfig {
            request: file_config.request,
            endpoints: file_config.endpoints,
            settings: file_config.controller.into(),
        })
    }
}

fn validate(request: &PaymentRequestConfig) -> Result<(), ConfigError> {
    if request.destination.trim().is_empty() {
        return Err(ConfigError::ValidationError("request.destination is empty".to_owned()));
    }
    if request.coin_type == CoinType::Token && request.token_id.as_deref().is_none_or(str::is_empty) {
        return Err(ConfigError::ValidationError(
            "request.token_id is required when coin_type is SLP".to_owned(),
        ));
    }
    match (request.price, request.amount) {
        (None, None) => Err(ConfigError::ValidationError(
            "one of request.price or request.amount must be set".to_owned(),
        )),
        (Some(value), _) | (_, Some(value)) if value.is_sign_negative() || value.is_zero() => Err(
            ConfigError::ValidationError(format!("request amount {value} must be positive")),
        ),
        _ => Ok(()),
    }
}
