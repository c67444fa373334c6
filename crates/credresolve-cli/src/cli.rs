//! Command-line interface.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use credresolve_core::config::Settings;
use credresolve_core::interpolate::interpolate;
use credresolve_core::resolver::{CredentialResolver, ResolverFactory};
use credresolve_core::types::VariableDefinition;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolve pipeline variables against a secret store
#[derive(Parser, Debug)]
#[command(name = "credresolve", version)]
pub struct Cli {
    /// Settings file (defaults to the user-level settings)
    #[arg(long, env = "CREDRESOLVE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Backend to use, overriding the settings (memory, env, file)
    #[arg(long, env = "CREDRESOLVE_BACKEND")]
    pub backend: Option<String>,

    /// YAML store for the file backend
    #[arg(long, env = "CREDRESOLVE_STORE")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Team the pipeline belongs to
    #[arg(long, env = "CREDRESOLVE_TEAM")]
    pub team: String,

    /// Pipeline name
    #[arg(long, env = "CREDRESOLVE_PIPELINE", default_value = "")]
    pub pipeline: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value of a variable
    Get {
        /// Variable name, without parentheses
        name: String,
    },

    /// List the secret paths visible to the team
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a file with every ((name)) replaced by its value
    Interpolate {
        /// File to read
        file: PathBuf,
    },
}

impl Cli {
    /// Effective settings after command-line overrides
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::user()?,
        };
        if let Some(backend) = &self.backend {
            settings.backend = backend.clone();
        }
        if let Some(store) = &self.store {
            settings.file = Some(store.clone());
            if self.backend.is_none() {
                settings.backend = "file".to_string();
            }
        }
        Ok(settings)
    }
}

/// Run the command and return what should be printed.
pub fn execute(cli: &Cli) -> Result<String> {
    let settings = cli.settings()?;
    debug!(backend = %settings.backend, team = %cli.team, pipeline = %cli.pipeline, "resolving");
    let resolver = ResolverFactory::from_settings(&settings)?.for_pipeline(&cli.team, &cli.pipeline);

    match &cli.command {
        Command::Get { name } => get(&resolver, name),
        Command::List { json } => list(&resolver, *json),
        Command::Interpolate { file } => {
            let text = fs::read_to_string(file).map_err(|source| Error::Read {
                path: file.display().to_string(),
                source,
            })?;
            Ok(interpolate(&text, &resolver)?)
        }
    }
}

fn get(resolver: &CredentialResolver, name: &str) -> Result<String> {
    let var = VariableDefinition::new(name)?;
    let secret = resolver.get(&var)?;
    debug!(path = %secret.path, tier = secret.tier.as_str(), "resolved");
    Ok(format!("{}\n", secret.value))
}

fn list(resolver: &CredentialResolver, json: bool) -> Result<String> {
    let paths = resolver.list()?;
    if json {
        let result = serde_json::json!({
            "secrets": paths,
            "count": paths.len(),
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&result)?));
    }
    Ok(paths.iter().map(|p| format!("{}\n", p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn store() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "/concourse/main/deploy/user: admin\n/concourse/main/token: shared\n/other/x: y"
        )
        .unwrap();
        file
    }

    fn parse(store: &tempfile::NamedTempFile, args: &[&str]) -> Cli {
        let settings = store.path().with_extension("missing.yaml");
        let mut argv = vec![
            "credresolve".to_string(),
            "--settings".to_string(),
            settings.display().to_string(),
            "--store".to_string(),
            store.path().display().to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_store_implies_file_backend() {
        let store = store();
        let cli = parse(&store, &["--team", "main", "get", "token"]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.backend, "file");
        assert_eq!(settings.file.as_deref(), Some(store.path()));
    }

    #[test]
    fn test_get_with_fallback() {
        let store = store();
        let cli = parse(&store, &["--team", "main", "--pipeline", "deploy", "get", "token"]);
        assert_eq!(execute(&cli).unwrap(), "shared\n");

        let cli = parse(&store, &["--team", "main", "--pipeline", "deploy", "get", "missing"]);
        assert!(matches!(execute(&cli), Err(Error::Resolve(_))));
    }

    #[test]
    fn test_list_json() {
        let store = store();
        let cli = parse(&store, &["--team", "main", "list", "--json"]);
        let out = execute(&cli).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["secrets"][0]["name"], "/concourse/main/deploy/user");
    }

    #[test]
    fn test_interpolate_file() {
        let store = store();
        let mut doc = tempfile::NamedTempFile::new().unwrap();
        write!(doc, "login: ((user)) / ((token))").unwrap();

        let path = doc.path().display().to_string();
        let cli = parse(
            &store,
            &["--team", "main", "--pipeline", "deploy", "interpolate", &path],
        );
        assert_eq!(execute(&cli).unwrap(), "login: admin / shared");
    }

    #[test]
    fn test_team_required() {
        let result = Cli::try_parse_from(["credresolve", "list"]);
        assert!(result.is_err());
    }
}
