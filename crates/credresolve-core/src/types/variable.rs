//! Variable, context and record types shared by the resolver and backends

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a variable definition is built from a blank name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Variable name must not be empty")]
pub struct InvalidVariableName;

/// A secret placeholder referenced by a pipeline, e.g. `((db-password))`
///
/// Created by whatever scans the pipeline document; the resolver only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableDefinition {
    name: String,
}

impl VariableDefinition {
    /// Create a definition, rejecting empty or whitespace-only names
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidVariableName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidVariableName);
        }
        Ok(Self { name })
    }

    /// The placeholder name (or, for listed variables, the full secret path)
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for VariableDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Team and pipeline a resolver is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    pub team: String,
    pub pipeline: String,
}

impl TemplateContext {
    pub fn new(team: impl Into<String>, pipeline: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            pipeline: pipeline.into(),
        }
    }
}

/// A path/value pair as held by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub path: String,
    pub value: String,
}

impl SecretRecord {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Which template produced a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The pipeline-scoped template
    Primary,
    /// The team-wide template, consulted only after the primary lookup failed
    Fallback,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Fallback => "fallback",
        }
    }
}

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The decrypted secret value
    pub value: String,
    /// Backend path the value was read from
    pub path: String,
    /// Template tier that produced `path`
    pub tier: Tier,
}
