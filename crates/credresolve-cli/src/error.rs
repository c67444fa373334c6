//! Error types for the command line front end

use credresolve_core::config::ConfigError;
use credresolve_core::interpolate::InterpolateError;
use credresolve_core::resolver::ResolveError;
use credresolve_core::types::InvalidVariableName;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Interpolate(#[from] InterpolateError),

    #[error(transparent)]
    InvalidName(#[from] InvalidVariableName),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
