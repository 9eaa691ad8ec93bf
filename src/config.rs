use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Non-secret options for one import run, as loaded from the YAML file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportOptions {
    /// The board the lists, labels and cards live on.
    pub board_id: String,
    /// Input file (CSV or JSON). May be overridden on the command line.
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub policy: CreationPolicy,
}

impl ImportOptions {
    pub fn trace_loaded(&self) {
        info!(
            board_id = %self.board_id,
            input = ?self.input,
            "Loaded import options"
        );
        debug!(?self, "Import options (full debug)");
    }
}

/// Controls whether missing parent entities may be auto-created, and whether
/// labels are handled at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreationPolicy {
    /// Create lists that the input references but the board lacks.
    #[serde(default = "default_true")]
    pub create_missing_lists: bool,
    /// Create labels that the input references but the board lacks.
    #[serde(default = "default_true")]
    pub create_missing_labels: bool,
    /// Ignore label columns entirely: no fetch, no creation, cards are
    /// created without labels.
    #[serde(default)]
    pub skip_labels: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CreationPolicy {
    fn default() -> Self {
        CreationPolicy {
            create_missing_lists: true,
            create_missing_labels: true,
            skip_labels: false,
        }
    }
}

/// Trello API credentials, resolved once per run and injected into the
/// client at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

impl Credentials {
    pub fn trace_loaded(&self) {
        info!(
            api_key_len = self.api_key.len(),
            api_token_len = self.api_token.len(),
            "Loaded Trello credentials"
        );
    }
}
