//! `((name))` placeholder substitution over arbitrary text

use std::thread;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::debug;

use crate::backend::SecretBackend;
use crate::resolver::{CredentialResolver, ResolveError, ResolveResult};
use crate::types::{ResolvedSecret, VariableDefinition};

const OPEN: &str = "((";
const CLOSE: &str = "))";

/// Upper bound on lookups in flight at once
const MAX_CONCURRENT_LOOKUPS: usize = 16;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolateError {
    /// One or more placeholders could not be resolved; nothing was substituted
    #[error("Unresolved variables: {}", names.join(", "))]
    Unresolved {
        names: Vec<String>,
        #[source]
        source: ResolveError,
    },
}

enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':')
}

fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let name = after_open[..end].trim();
        if name.is_empty() || !name.chars().all(is_name_char) {
            // not a token here; retry from the next '('
            let skip = start + 1;
            out.push(Segment::Text(&rest[..skip]));
            rest = &rest[skip..];
            continue;
        }
        out.push(Segment::Text(&rest[..start]));
        out.push(Segment::Placeholder(name));
        rest = &after_open[end + CLOSE.len()..];
    }
    out.push(Segment::Text(rest));
    out
}

/// Distinct placeholder names in order of first appearance
pub fn placeholders(text: &str) -> Vec<VariableDefinition> {
    let mut seen: IndexSet<&str> = IndexSet::new();
    for segment in segments(text) {
        if let Segment::Placeholder(name) = segment {
            seen.insert(name);
        }
    }
    seen.into_iter()
        .filter_map(|name| VariableDefinition::new(name).ok())
        .collect()
}

/// Replace every `((name))` in `text` with its resolved value
///
/// Each distinct name is resolved once, with at most 16 lookups in flight.
/// If any name fails, the error lists all failed names and carries the
/// first failure.
pub fn interpolate<B: SecretBackend>(
    text: &str,
    resolver: &CredentialResolver<B>,
) -> Result<String, InterpolateError> {
    let vars = placeholders(text);
    debug!(count = vars.len(), "interpolating placeholders");

    let mut results: Vec<ResolveResult<ResolvedSecret>> = Vec::with_capacity(vars.len());
    for chunk in vars.chunks(MAX_CONCURRENT_LOOKUPS) {
        thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|var| scope.spawn(move || resolver.get(var)))
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
    }

    let mut values: IndexMap<&str, String> = IndexMap::new();
    let mut failed = Vec::new();
    let mut first_error = None;
    for (var, result) in vars.iter().zip(results) {
        match result {
            Ok(secret) => {
                values.insert(var.name(), secret.value);
            }
            Err(err) => {
                failed.push(var.name().to_string());
                first_error.get_or_insert(err);
            }
        }
    }
    if let Some(source) = first_error {
        return Err(InterpolateError::Unresolved {
            names: failed,
            source,
        });
    }

    let mut out = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Text(literal) => out.push_str(literal),
            Segment::Placeholder(name) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push_str(CLOSE);
                }
            },
        }
    }
    Ok(out)
}
