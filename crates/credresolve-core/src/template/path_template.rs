//! Secret path templates
//!
//! A template is parsed once into literal and field tokens and rendered
//! against a [`TemplateContext`] plus a variable name. Fields can be written
//! as `{{.Team}}` (the form used by existing pipeline configuration) or as
//! the shorthand `{Team}`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::TemplateContext;

/// Default pipeline-scoped template
pub const DEFAULT_SECRET_TEMPLATE: &str = "/concourse/{{.Team}}/{{.Pipeline}}/{{.Secret}}";

/// Default team-scoped template
pub const DEFAULT_FALLBACK_TEMPLATE: &str = "/concourse/{{.Team}}/{{.Secret}}";

const TEAM_FIELD: &str = "Team";
const PIPELINE_FIELD: &str = "Pipeline";
const SECRET_FIELD: &str = "Secret";
const NAME_FIELD: &str = "Name";

/// Errors that can occur while parsing or rendering a template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Invalid template '{template}': {message}")]
    Parse { template: String, message: String },

    #[error("Template '{template}' references unknown field '{field}'")]
    UnknownField { template: String, field: String },
}

impl TemplateError {
    fn parse(template: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            template: template.to_string(),
            message: message.into(),
        }
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(String),
}

/// A parsed secret path template
///
/// # Example
///
/// ```
/// use credresolve_core::template::PathTemplate;
/// use credresolve_core::types::TemplateContext;
///
/// let template = PathTemplate::parse("/concourse/{{.Team}}/{{.Pipeline}}/{{.Secret}}").unwrap();
/// let context = TemplateContext::new("alpha", "bogus");
///
/// assert_eq!(template.render(&context, "cheery").unwrap(), "/concourse/alpha/bogus/cheery");
/// assert_eq!(template.render_prefix(&context).unwrap(), "/concourse/alpha/bogus");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    tokens: Vec<Token>,
}

impl PathTemplate {
    /// Parse template text
    pub fn parse(source: &str) -> TemplateResult<Self> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open..];

            let (field, consumed) = if let Some(inner) = after.strip_prefix("{{") {
                let close = inner
                    .find("}}")
                    .ok_or_else(|| TemplateError::parse(source, "unterminated '{{'"))?;
                let body = inner[..close].trim();
                let field = body.strip_prefix('.').ok_or_else(|| {
                    TemplateError::parse(source, format!("expected '.Field' inside braces, got '{}'", body))
                })?;
                (field.trim(), 2 + close + 2)
            } else {
                let inner = &after[1..];
                let close = inner
                    .find('}')
                    .ok_or_else(|| TemplateError::parse(source, "unterminated '{'"))?;
                (inner[..close].trim(), 1 + close + 1)
            };

            if !is_identifier(field) {
                return Err(TemplateError::parse(
                    source,
                    format!("invalid field name '{}'", field),
                ));
            }

            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(field.to_string()));
            rest = &after[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            tokens,
        })
    }

    /// The original template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template mentions `field` (`Secret` and `Name` are interchangeable)
    pub fn references(&self, field: &str) -> bool {
        self.tokens.iter().any(|token| match token {
            Token::Field(name) => name == field || (is_name_field(name) && is_name_field(field)),
            Token::Literal(_) => false,
        })
    }

    /// Whether the template includes the variable name segment
    pub fn references_name(&self) -> bool {
        self.references(SECRET_FIELD)
    }

    /// Render the path for `var_name`
    pub fn render(&self, context: &TemplateContext, var_name: &str) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.source.len() + var_name.len());
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(name) => out.push_str(self.lookup(context, var_name, name)?),
            }
        }
        Ok(out)
    }

    /// Render the enumeration root: the name segment is left empty and
    /// trailing separators are dropped
    pub fn render_prefix(&self, context: &TemplateContext) -> TemplateResult<String> {
        let rendered = self.render(context, "")?;
        let trimmed = rendered.trim_end_matches('/');
        if trimmed.is_empty() && rendered.starts_with('/') {
            return Ok("/".to_string());
        }
        Ok(trimmed.to_string())
    }

    fn lookup<'a>(
        &self,
        context: &'a TemplateContext,
        var_name: &'a str,
        field: &str,
    ) -> TemplateResult<&'a str> {
        match field {
            TEAM_FIELD => Ok(&context.team),
            PIPELINE_FIELD => Ok(&context.pipeline),
            f if is_name_field(f) => Ok(var_name),
            other => Err(TemplateError::UnknownField {
                template: self.source.clone(),
                field: other.to_string(),
            }),
        }
    }
}

impl FromStr for PathTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_name_field(field: &str) -> bool {
    field == SECRET_FIELD || field == NAME_FIELD
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        TemplateContext::new("alpha", "bogus")
    }

    #[test]
    fn test_default_templates_render() {
        let primary = PathTemplate::parse(DEFAULT_SECRET_TEMPLATE).unwrap();
        let fallback = PathTemplate::parse(DEFAULT_FALLBACK_TEMPLATE).unwrap();

        assert_eq!(primary.render(&context(), "cheery").unwrap(), "/concourse/alpha/bogus/cheery");
        assert_eq!(fallback.render(&context(), "cheery").unwrap(), "/concourse/alpha/cheery");
    }

    #[test]
    fn test_shorthand_fields() {
        let template = PathTemplate::parse("/concourse/{Team}/{Pipeline}/{Name}").unwrap();
        assert_eq!(template.render(&context(), "cheery").unwrap(), "/concourse/alpha/bogus/cheery");
    }

    #[test]
    fn test_whitespace_inside_braces() {
        let template = PathTemplate::parse("/x/{{ .Team }}/{{ .Secret }}").unwrap();
        assert_eq!(template.render(&context(), "s").unwrap(), "/x/alpha/s");
    }

    #[test]
    fn test_render_prefix_drops_name_segment() {
        let primary = PathTemplate::parse(DEFAULT_SECRET_TEMPLATE).unwrap();
        assert_eq!(primary.render_prefix(&context()).unwrap(), "/concourse/alpha/bogus");

        let root = PathTemplate::parse("/{{.Secret}}").unwrap();
        assert_eq!(root.render_prefix(&context()).unwrap(), "/");
    }

    #[test]
    fn test_unknown_field_fails_at_render() {
        let template = PathTemplate::parse("/concourse/{{.Team}}/{{.Region}}/{{.Secret}}").unwrap();
        let err = template.render(&context(), "cheery").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownField {
                template: "/concourse/{{.Team}}/{{.Region}}/{{.Secret}}".to_string(),
                field: "Region".to_string(),
            }
        );
        assert!(template.render_prefix(&context()).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(PathTemplate::parse("/a/{{.Team"), Err(TemplateError::Parse { .. })));
        assert!(matches!(PathTemplate::parse("/a/{Team"), Err(TemplateError::Parse { .. })));
        assert!(matches!(PathTemplate::parse("/a/{{Team}}"), Err(TemplateError::Parse { .. })));
        assert!(matches!(PathTemplate::parse("/a/{}"), Err(TemplateError::Parse { .. })));
        assert!(matches!(PathTemplate::parse("/a/{{.}}"), Err(TemplateError::Parse { .. })));
    }

    #[test]
    fn test_literal_only_template() {
        let template: PathTemplate = "/static/path".parse().unwrap();
        assert_eq!(template.render(&context(), "ignored").unwrap(), "/static/path");
        assert!(!template.references_name());
        assert_eq!(template.to_string(), "/static/path");
    }

    #[test]
    fn test_references() {
        let fallback = PathTemplate::parse(DEFAULT_FALLBACK_TEMPLATE).unwrap();
        assert!(fallback.references("Team"));
        assert!(!fallback.references("Pipeline"));
        assert!(fallback.references("Name"));
        assert!(fallback.references_name());
    }
}
