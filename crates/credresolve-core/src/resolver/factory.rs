//! Per-pipeline resolver construction

use std::sync::Arc;

use tracing::debug;

use super::credential_resolver::{CredentialResolver, ResolverConfig};
use crate::backend::{create_backend, SecretBackend};
use crate::config::{ConfigError, ConfigResult, Settings};
use crate::template::PathTemplate;
use crate::types::TemplateContext;

/// Holds the backend and templates once and builds a resolver per pipeline
///
/// # Example
///
/// ```
/// use credresolve_core::config::Settings;
/// use credresolve_core::resolver::ResolverFactory;
///
/// let settings = Settings { backend: "memory".to_string(), ..Settings::default() };
/// let factory = ResolverFactory::from_settings(&settings).unwrap();
///
/// let resolver = factory.for_pipeline("alpha", "bogus");
/// assert_eq!(resolver.context().pipeline, "bogus");
/// ```
pub struct ResolverFactory {
    backend: Arc<dyn SecretBackend>,
    primary: PathTemplate,
    fallback: Option<PathTemplate>,
}

impl ResolverFactory {
    /// Create a factory, checking that both templates render and name the variable
    pub fn new(
        backend: Arc<dyn SecretBackend>,
        primary: PathTemplate,
        fallback: Option<PathTemplate>,
    ) -> ConfigResult<Self> {
        validate(&primary, "secret")?;
        if let Some(fallback) = &fallback {
            validate(fallback, "fallback")?;
        }
        Ok(Self {
            backend,
            primary,
            fallback,
        })
    }

    /// Build the backend and templates named by `settings`
    pub fn from_settings(settings: &Settings) -> ConfigResult<Self> {
        let backend = create_backend(&settings.backend, &settings.backend_options())?;
        let primary = PathTemplate::parse(&settings.secret_template)?;
        let fallback = settings
            .fallback_template
            .as_deref()
            .map(PathTemplate::parse)
            .transpose()?;
        debug!(
            backend = %settings.backend,
            secret_template = %settings.secret_template,
            fallback = fallback.is_some(),
            "created resolver factory"
        );
        Self::new(backend, primary, fallback)
    }

    pub fn backend(&self) -> &Arc<dyn SecretBackend> {
        &self.backend
    }

    /// Resolver bound to `team` and `pipeline`
    pub fn for_pipeline(&self, team: &str, pipeline: &str) -> CredentialResolver {
        CredentialResolver::new(
            ResolverConfig {
                backend: Arc::clone(&self.backend),
                primary: self.primary.clone(),
                fallback: self.fallback.clone(),
            },
            TemplateContext::new(team, pipeline),
        )
    }
}

fn validate(template: &PathTemplate, which: &str) -> ConfigResult<()> {
    if !template.references_name() {
        return Err(ConfigError::Invalid(format!(
            "{} template '{}' does not reference the secret name",
            which, template
        )));
    }
    template.render(&TemplateContext::new("team", "pipeline"), "name")?;
    Ok(())
}

impl std::fmt::Debug for ResolverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverFactory")
            .field("backend", &self.backend.name())
            .field("primary", &self.primary.source())
            .field("fallback", &self.fallback.as_ref().map(PathTemplate::source))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::template::{TemplateError, DEFAULT_FALLBACK_TEMPLATE, DEFAULT_SECRET_TEMPLATE};
    use crate::types::{Tier, VariableDefinition};

    fn template(source: &str) -> PathTemplate {
        PathTemplate::parse(source).unwrap()
    }

    #[test]
    fn test_factory_shares_backend_across_pipelines() {
        let backend = Arc::new(MemoryBackend::new());
        backend.put("/concourse/main/deploy/token", "deploy token");
        backend.put("/concourse/main/token", "team token");

        let factory = ResolverFactory::new(
            backend.clone(),
            template(DEFAULT_SECRET_TEMPLATE),
            Some(template(DEFAULT_FALLBACK_TEMPLATE)),
        )
        .unwrap();
        let token = VariableDefinition::new("token").unwrap();

        let deploy = factory.for_pipeline("main", "deploy").get(&token).unwrap();
        assert_eq!(deploy.value, "deploy token");
        assert_eq!(deploy.tier, Tier::Primary);

        let test = factory.for_pipeline("main", "test").get(&token).unwrap();
        assert_eq!(test.value, "team token");
        assert_eq!(test.tier, Tier::Fallback);
    }

    #[test]
    fn test_template_without_name_rejected() {
        let result = ResolverFactory::new(
            Arc::new(MemoryBackend::new()),
            template("/concourse/{{.Team}}/{{.Pipeline}}"),
            None,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = ResolverFactory::new(
            Arc::new(MemoryBackend::new()),
            template(DEFAULT_SECRET_TEMPLATE),
            Some(template("/concourse/shared")),
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_template_with_unknown_field_rejected() {
        let result = ResolverFactory::new(
            Arc::new(MemoryBackend::new()),
            template("/{{.Region}}/{{.Secret}}"),
            None,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Template(TemplateError::UnknownField { .. }))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            backend: "memory".to_string(),
            fallback_template: None,
            ..Settings::default()
        };
        let factory = ResolverFactory::from_settings(&settings).unwrap();
        assert_eq!(factory.backend().name(), "memory");

        let resolver = factory.for_pipeline("alpha", "bogus");
        assert!(resolver.fallback_template().is_none());
        assert_eq!(resolver.primary_template().source(), DEFAULT_SECRET_TEMPLATE);
    }

    #[test]
    fn test_from_settings_errors() {
        let unknown = Settings {
            backend: "vault-xyz".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            ResolverFactory::from_settings(&unknown),
            Err(ConfigError::UnknownBackend(_))
        ));

        let malformed = Settings {
            backend: "memory".to_string(),
            secret_template: "/concourse/{{.Team".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            ResolverFactory::from_settings(&malformed),
            Err(ConfigError::Template(TemplateError::Parse { .. }))
        ));
    }
}
