//! Secret path construction from team/pipeline/name templates

mod path_template;

pub use path_template::{
    PathTemplate, TemplateError, TemplateResult, DEFAULT_FALLBACK_TEMPLATE,
    DEFAULT_SECRET_TEMPLATE,
};
