//! Variable resolution against a secret backend
//!
//! `CredentialResolver` is what callers use: it renders paths, queries the
//! backend with primary/fallback semantics and aggregates listings.
//! `ResolverFactory` builds one resolver per team/pipeline from shared settings.

mod credential_resolver;
mod error;
mod factory;

pub use credential_resolver::{CredentialResolver, ResolverConfig};
pub use error::{ResolveError, ResolveResult};
pub use factory::ResolverFactory;
