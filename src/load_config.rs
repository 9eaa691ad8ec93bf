use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::{Credentials, ImportOptions};
use crate::creds::CredentialStore;
use crate::error::ImportError;

/// Everything one run needs: the parsed options file plus resolved
/// credentials.
#[derive(Debug)]
pub struct RunConfig {
    pub options: ImportOptions,
    pub credentials: Credentials,
}

/// Loads the static YAML options file (no secrets) and resolves credentials:
/// environment variables first (`TRELLO_API_KEY` / `TRELLO_API_TOKEN`), the
/// credential store second.
pub fn load_config(path: impl AsRef<Path>, store: &CredentialStore) -> Result<RunConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("failed to read config file {}", path_ref.display()))?;

    let options: ImportOptions = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("failed to parse config YAML: {e}")
    })?;
    options.trace_loaded();

    let credentials = resolve_credentials(store)?;
    credentials.trace_loaded();

    Ok(RunConfig {
        options,
        credentials,
    })
}

/// Env-over-store credential resolution. Missing either value is
/// [`ImportError::AuthNotConfigured`].
pub fn resolve_credentials(store: &CredentialStore) -> Result<Credentials> {
    let from_env = |var: &str| std::env::var(var).ok().filter(|v| !v.is_empty());

    if let (Some(api_key), Some(api_token)) =
        (from_env("TRELLO_API_KEY"), from_env("TRELLO_API_TOKEN"))
    {
        info!("Using Trello credentials from environment");
        return Ok(Credentials { api_key, api_token });
    }

    match store.credentials()? {
        Some(creds) => {
            info!("Using Trello credentials from credential store");
            Ok(creds)
        }
        None => {
            error!("No Trello credentials in environment or credential store");
            Err(ImportError::AuthNotConfigured.into())
        }
    }
}
