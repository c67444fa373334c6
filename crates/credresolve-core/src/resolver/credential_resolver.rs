//! Primary/fallback secret resolution for one team and pipeline
//!
//! Lookups try the pipeline-scoped template first and, when one is
//! configured, the team-scoped fallback template second:
//! 1. Primary path found → returned; the fallback is never queried
//! 2. Primary failed, no fallback template → the primary error is returned
//! 3. Primary failed, fallback found → the fallback value is returned
//! 4. Both failed → the fallback error is returned
//!
//! Backends cannot tell "absent" from "unreachable", so every backend error
//! is treated the same way.

use std::sync::Arc;

use tracing::debug;

use super::error::{ResolveError, ResolveResult};
use crate::backend::{SecretBackend, ValueRequest};
use crate::template::PathTemplate;
use crate::types::{ResolvedSecret, TemplateContext, Tier, VariableDefinition};

/// Backend handle and templates a resolver is built from
#[derive(Debug, Clone)]
pub struct ResolverConfig<B> {
    pub backend: B,
    /// Pipeline-scoped template
    pub primary: PathTemplate,
    /// Team-scoped template; `None` disables the fallback tier
    pub fallback: Option<PathTemplate>,
}

/// Resolves variables for one team/pipeline against a backend
///
/// Immutable once built: `get` can be called concurrently from many threads.
///
/// # Example
///
/// ```
/// use credresolve_core::backend::MemoryBackend;
/// use credresolve_core::resolver::{CredentialResolver, ResolverConfig};
/// use credresolve_core::template::{PathTemplate, DEFAULT_FALLBACK_TEMPLATE, DEFAULT_SECRET_TEMPLATE};
/// use credresolve_core::types::{TemplateContext, Tier, VariableDefinition};
///
/// let backend = MemoryBackend::new();
/// backend.put("/concourse/alpha/cheery", "team-wide");
///
/// let resolver = CredentialResolver::new(
///     ResolverConfig {
///         backend,
///         primary: PathTemplate::parse(DEFAULT_SECRET_TEMPLATE).unwrap(),
///         fallback: Some(PathTemplate::parse(DEFAULT_FALLBACK_TEMPLATE).unwrap()),
///     },
///     TemplateContext::new("alpha", "bogus"),
/// );
///
/// let secret = resolver.get(&VariableDefinition::new("cheery").unwrap()).unwrap();
/// assert_eq!(secret.value, "team-wide");
/// assert_eq!(secret.tier, Tier::Fallback);
/// ```
#[derive(Clone)]
pub struct CredentialResolver<B = Arc<dyn SecretBackend>> {
    backend: B,
    context: TemplateContext,
    primary: PathTemplate,
    fallback: Option<PathTemplate>,
}

impl<B: SecretBackend> CredentialResolver<B> {
    /// Bind a configuration to a team/pipeline context
    pub fn new(config: ResolverConfig<B>, context: TemplateContext) -> Self {
        Self {
            backend: config.backend,
            context,
            primary: config.primary,
            fallback: config.fallback,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }

    pub fn primary_template(&self) -> &PathTemplate {
        &self.primary
    }

    pub fn fallback_template(&self) -> Option<&PathTemplate> {
        self.fallback.as_ref()
    }

    /// Resolve one variable
    ///
    /// `Ok` means the variable was found. On `Err`, the error comes from the
    /// last lookup attempted: the fallback's when a fallback template is
    /// configured, the primary's otherwise.
    pub fn get(&self, var: &VariableDefinition) -> ResolveResult<ResolvedSecret> {
        let primary_path = self.primary.render(&self.context, var.name())?;
        debug!(
            team = %self.context.team,
            pipeline = %self.context.pipeline,
            path = %primary_path,
            "looking up secret"
        );

        let primary_err = match self.fetch(&primary_path) {
            Ok(value) => return Ok(resolved(value, primary_path, Tier::Primary)),
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        let fallback_path = fallback.render(&self.context, var.name())?;
        debug!(
            team = %self.context.team,
            path = %fallback_path,
            "primary lookup failed, trying fallback"
        );

        let value = self.fetch(&fallback_path)?;
        Ok(resolved(value, fallback_path, Tier::Fallback))
    }

    /// Enumerate every secret under the primary template's root
    ///
    /// Names are the fully-qualified backend paths, deduplicated, in the
    /// order they were first seen. Any page failure fails the whole listing.
    pub fn list(&self) -> ResolveResult<Vec<VariableDefinition>> {
        let prefix = self.primary.render_prefix(&self.context)?;

        let mut pages = self.backend.enumerate_under(&prefix);
        let paths = pages.drain_unique().map_err(|source| ResolveError::Aggregation {
            prefix: prefix.clone(),
            pages_read: pages.pages_read(),
            source,
        })?;
        debug!(%prefix, pages = pages.pages_read(), count = paths.len(), "listed secrets");

        Ok(paths
            .into_iter()
            .filter_map(|path| VariableDefinition::new(path).ok())
            .collect())
    }

    fn fetch(&self, path: &str) -> ResolveResult<String> {
        self.backend
            .fetch_value(&ValueRequest::decrypted(path))
            .map_err(|source| ResolveError::Lookup {
                path: path.to_string(),
                source,
            })
    }
}

// Trait-object backends have no Debug impl
impl<B: SecretBackend> std::fmt::Debug for CredentialResolver<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("backend", &self.backend.name())
            .field("context", &self.context)
            .field("primary", &self.primary.source())
            .field("fallback", &self.fallback.as_ref().map(PathTemplate::source))
            .finish()
    }
}

fn resolved(value: String, path: String, tier: Tier) -> ResolvedSecret {
    ResolvedSecret { value, path, tier }
}
