//! Core types for secret resolution

mod variable;

pub use variable::{
    InvalidVariableName, ResolvedSecret, SecretRecord, TemplateContext, Tier, VariableDefinition,
};
