//! # Processor Configuration
//!
//! Defines the static configuration of the processor (its named properties and
//! the operator-defined dynamic properties) and of the shared HTTP transport, and
//! loads both from an optional YAML file layered with environment variables.
//!
//! Layers, lowest precedence first:
//! 1. Programmatic defaults (timeouts, TLS verification on).
//! 2. The YAML file given explicitly, or `postimage.yml` in the working directory.
//! 3. `POSTIMAGE_...` environment variables, `__` separating nested keys
//!    (e.g. `POSTIMAGE_TRANSPORT__ACCEPT_INVALID_CERTS=true`).
//!
//! Keys taken from environment variables are lowercased, so a dynamic property
//! set as `POSTIMAGE_PROCESSOR__DYNAMIC__ModelName` is forwarded as the field
//! `modelname`. Dynamic properties whose field name is case-sensitive belong in
//! the YAML file, where keys keep their case.

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, PROP_BASIC_PASSWORD,
    PROP_BASIC_USERNAME, PROP_FIELD_NAME, PROP_HEADER_NAME, PROP_HEADER_VALUE, PROP_IMAGE_NAME,
    PROP_IMAGE_TYPE, PROP_URL,
};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "postimage.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Property '{0}' is set but blank")]
    BlankProperty(&'static str),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Static property values of the processor.
///
/// Every value may be a literal or a `${attr}` template evaluated against each
/// record. Unset values fall back to the record attribute of the same name and
/// then to the built-in default.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProcessorConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fieldname: Option<String>,
    #[serde(default)]
    pub imagename: Option<String>,
    #[serde(default)]
    pub imagetype: Option<String>,
    #[serde(default)]
    pub headername: Option<String>,
    #[serde(default)]
    pub headervalue: Option<String>,
    #[serde(default)]
    pub basicusername: Option<String>,
    #[serde(default)]
    pub basicpassword: Option<String>,
    /// Operator-defined properties, each forwarded as an extra multipart text field.
    #[serde(default)]
    pub dynamic: BTreeMap<String, String>,
}

impl ProcessorConfig {
    /// Looks up a fixed property by its name.
    pub fn property(&self, name: &str) -> Option<&str> {
        let value = match name {
            PROP_URL => &self.url,
            PROP_FIELD_NAME => &self.fieldname,
            PROP_IMAGE_NAME => &self.imagename,
            PROP_IMAGE_TYPE => &self.imagetype,
            PROP_HEADER_NAME => &self.headername,
            PROP_HEADER_VALUE => &self.headervalue,
            PROP_BASIC_USERNAME => &self.basicusername,
            PROP_BASIC_PASSWORD => &self.basicpassword,
            _ => return None,
        };
        value.as_deref()
    }

    /// Rejects required properties that are configured but blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [PROP_URL, PROP_FIELD_NAME, PROP_IMAGE_NAME, PROP_IMAGE_TYPE] {
            if matches!(self.property(name), Some(value) if value.trim().is_empty()) {
                return Err(ConfigError::BlankProperty(name));
            }
        }
        Ok(())
    }
}

/// Settings of the shared HTTP transport.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Skips TLS certificate verification, for self-signed internal services.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Sends resolved basic-auth credentials as an `Authorization` header.
    #[serde(default)]
    pub apply_basic_auth: bool,
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            accept_invalid_certs: false,
            apply_basic_auth: false,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// The root configuration structure, mapping directly to `postimage.yml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Loads the configuration from a YAML file and `POSTIMAGE_` environment variables.
///
/// An explicit `path` must exist. Without one, `postimage.yml` in the working
/// directory is used when present and skipped otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        .set_default(
            "transport.connect_timeout_secs",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?
        .set_default("transport.read_timeout_secs", DEFAULT_READ_TIMEOUT_SECS)?
        .set_default("transport.accept_invalid_certs", false)?
        .set_default("transport.apply_basic_auth", false)?;

    let file_content = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(format!(
                    "Config file not found at '{}'.",
                    path.display()
                )));
            }
            Some(read_config_file(path)?)
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                Some(read_config_file(default_path)?)
            } else {
                None
            }
        }
    };

    if let Some(content) = file_content {
        builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("POSTIMAGE")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.processor.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    info!("Loading configuration from '{}'.", path.display());
    fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })
}
