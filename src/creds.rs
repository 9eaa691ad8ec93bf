//! Credential persistence: a small key-value store, private to the acting
//! user, backed by a JSON file. Storing `None` clears a key.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Credentials;

pub const KEY_API_KEY: &str = "api_key";
pub const KEY_API_TOKEN: &str = "api_token";

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    /// Default location under the user's config directory.
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME not set, cannot locate credential store")?;
        Ok(Path::new(&home).join(".config/trello-import/credentials.json"))
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    /// Sets or, when `value` is `None`, clears a key.
    pub fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut entries = self.read_all()?;
        match value {
            Some(v) => {
                entries.insert(key.to_string(), v.to_string());
            }
            None => {
                entries.remove(key);
            }
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), key, cleared = value.is_none(), "Credential store updated");
        Ok(())
    }

    /// Both credentials, if both are present and non-empty.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        let entries = self.read_all()?;
        match (entries.get(KEY_API_KEY), entries.get(KEY_API_TOKEN)) {
            (Some(key), Some(token)) if !key.is_empty() && !token.is_empty() => {
                Ok(Some(Credentials {
                    api_key: key.clone(),
                    api_token: token.clone(),
                }))
            }
            _ => Ok(None),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Credential store file absent");
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("credential store {} is corrupt", self.path.display()))
    }
}
