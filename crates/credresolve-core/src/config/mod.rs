//! Resolver configuration
//!
//! Settings name the backend and the primary/fallback templates; they are
//! read from a YAML file at user level or from an explicit path.

mod error;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Settings, DEFAULT_BACKEND};
