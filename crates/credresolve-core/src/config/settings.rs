//! File-based resolver settings (YAML)
//!
//! ```yaml
//! backend: file
//! file: secrets.yaml
//! secret_template: "/concourse/{{.Team}}/{{.Pipeline}}/{{.Secret}}"
//! fallback_template: "/concourse/{{.Team}}/{{.Secret}}"
//! ```
//!
//! Every key is optional. `fallback_template: null` disables the fallback tier.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::ConfigResult;
use crate::backend::BackendOptions;
use crate::template::{DEFAULT_FALLBACK_TEMPLATE, DEFAULT_SECRET_TEMPLATE};

/// Backend used when the settings do not name one
pub const DEFAULT_BACKEND: &str = "env";

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Registered backend name (`memory`, `env`, `file`, or a custom registration)
    pub backend: String,
    /// Pipeline-scoped template
    pub secret_template: String,
    /// Team-scoped template; `None` disables the fallback tier
    pub fallback_template: Option<String>,
    /// Store file for the `file` backend, relative to the settings file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            secret_template: DEFAULT_SECRET_TEMPLATE.to_string(),
            fallback_template: Some(DEFAULT_FALLBACK_TEMPLATE.to_string()),
            file: None,
        }
    }
}

impl Settings {
    /// User-level settings path (`<config dir>/credresolve/settings.yaml`)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("credresolve").join("settings.yaml")
    }

    /// Load the user-level settings
    pub fn user() -> ConfigResult<Self> {
        Self::load(Self::user_path())
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut settings = Self::from_yaml(&content)?;
        if let (Some(file), Some(parent)) = (settings.file.as_ref(), path.parent()) {
            if file.is_relative() {
                settings.file = Some(parent.join(file));
            }
        }
        Ok(settings)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Options handed to the backend factory
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            file: self.file.clone(),
        }
    }
}
