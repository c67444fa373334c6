//! Configuration error types

use crate::template::TemplateError;

/// Errors that can occur while loading settings or building resolvers
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
