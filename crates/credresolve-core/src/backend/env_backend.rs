//! Environment variable backend

use std::env;

use super::traits::{offset_page, BackendError, BackendResult, Page, PageRequest, SecretBackend, ValueRequest};

/// Backend that reads secrets from environment variables
///
/// A path maps to a variable name by upper-casing it and replacing every
/// character that is not alphanumeric with `_`, ignoring leading separators:
/// `/concourse/alpha/cheery` → `CONCOURSE_ALPHA_CHEERY`.
///
/// Listing maps the other way, so it is lossy: the variable
/// `CONCOURSE_ALPHA_DB_PASSWORD` listed under `/concourse/alpha` is reported as
/// `/concourse/alpha/db_password`.
///
/// # Example
///
/// ```
/// use credresolve_core::backend::EnvBackend;
///
/// assert_eq!(EnvBackend::var_name("/concourse/alpha/cheery"), "CONCOURSE_ALPHA_CHEERY");
/// ```
#[derive(Debug, Default)]
pub struct EnvBackend {
    _private: (),
}

impl EnvBackend {
    /// Create a new environment variable backend
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Environment variable consulted for `path`
    pub fn var_name(path: &str) -> String {
        path.trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl SecretBackend for EnvBackend {
    fn name(&self) -> &str {
        "env"
    }

    fn fetch_value(&self, request: &ValueRequest) -> BackendResult<String> {
        let var = Self::var_name(&request.path);
        match env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) | Err(env::VarError::NotPresent) => Err(BackendError::NotFound(request.path.clone())),
            Err(env::VarError::NotUnicode(_)) => Err(BackendError::Other(format!(
                "{} is not valid unicode",
                var
            ))),
        }
    }

    fn fetch_page(&self, request: &PageRequest) -> BackendResult<Page> {
        let base = request.prefix.trim_end_matches('/');
        let var_prefix = match Self::var_name(base) {
            p if p.is_empty() => String::new(),
            p => format!("{}_", p),
        };

        let mut names: Vec<String> = env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .filter_map(|key| {
                let rest = key.strip_prefix(&var_prefix)?;
                if rest.is_empty() {
                    return None;
                }
                Some(format!("{}/{}", base, rest.to_ascii_lowercase()))
            })
            .collect();
        names.sort();

        offset_page(names.into_iter(), request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    // Tests that touch the process environment run one at a time
    static ENV_LOCK: Mutex<()> = parking_lot::const_mutex(());

    #[test]
    fn test_env_backend_name() {
        assert_eq!(EnvBackend::new().name(), "env");
    }

    #[test]
    fn test_var_name_mapping() {
        assert_eq!(EnvBackend::var_name("/concourse/alpha/bogus/cheery"), "CONCOURSE_ALPHA_BOGUS_CHEERY");
        assert_eq!(EnvBackend::var_name("team-a/db.password"), "TEAM_A_DB_PASSWORD");
        assert_eq!(EnvBackend::var_name("/"), "");
    }

    #[test]
    fn test_env_backend_fetch() {
        let _guard = ENV_LOCK.lock();
        env::set_var("CREDRESOLVE_TEST_ENV_FETCH_CHEERY", "from env");

        let backend = EnvBackend::new();
        assert_eq!(
            backend.fetch_value(&ValueRequest::decrypted("/credresolve_test_env_fetch/cheery")),
            Ok("from env".to_string())
        );
        assert_eq!(
            backend.fetch_value(&ValueRequest::decrypted("/credresolve_test_env_fetch/missing")),
            Err(BackendError::NotFound("/credresolve_test_env_fetch/missing".to_string()))
        );

        env::remove_var("CREDRESOLVE_TEST_ENV_FETCH_CHEERY");
    }

    #[test]
    fn test_env_backend_empty_value_is_missing() {
        let _guard = ENV_LOCK.lock();
        env::set_var("CREDRESOLVE_TEST_ENV_EMPTY", "");

        let backend = EnvBackend::new();
        assert!(backend.fetch_value(&ValueRequest::decrypted("/credresolve_test_env_empty")).is_err());

        env::remove_var("CREDRESOLVE_TEST_ENV_EMPTY");
    }

    #[test]
    fn test_env_backend_list_sees_variables_set_later() {
        let _guard = ENV_LOCK.lock();
        let backend = EnvBackend::new();
        assert!(backend
            .enumerate_under("/credresolve_test_env_late")
            .drain_unique()
            .unwrap()
            .is_empty());

        env::set_var("CREDRESOLVE_TEST_ENV_LATE_TOKEN", "x");
        let names = backend
            .enumerate_under("/credresolve_test_env_late")
            .drain_unique()
            .unwrap();
        env::remove_var("CREDRESOLVE_TEST_ENV_LATE_TOKEN");

        assert_eq!(names.len(), 1);
        assert!(names.contains("/credresolve_test_env_late/token"));
    }

    #[test]
    fn test_env_backend_list() {
        let _guard = ENV_LOCK.lock();
        env::set_var("CREDRESOLVE_TEST_ENV_LIST_B", "2");
        env::set_var("CREDRESOLVE_TEST_ENV_LIST_A", "1");

        let backend = EnvBackend::new();
        let names = backend
            .enumerate_under("/credresolve_test_env_list")
            .drain_unique()
            .unwrap();
        let names: Vec<_> = names.into_iter().collect();
        assert_eq!(
            names,
            vec!["/credresolve_test_env_list/a", "/credresolve_test_env_list/b"]
        );

        env::remove_var("CREDRESOLVE_TEST_ENV_LIST_A");
        env::remove_var("CREDRESOLVE_TEST_ENV_LIST_B");
    }
}
