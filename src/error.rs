use thiserror::Error;

/// Errors produced by the import pipeline.
///
/// Every stage-level error aborts the run; partial remote state (already
/// created lists, labels, cards) is left as-is and reported through the
/// progress sink.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input file could not be read or parsed at all.
    #[error("unreadable or malformed input: {0}")]
    InputFormat(String),

    /// Parsing succeeded but zero valid records survived normalization.
    #[error("no valid records found in input")]
    EmptyInput,

    /// A required list or label is absent remotely and the creation policy
    /// forbids creating it.
    #[error("missing {kind} \"{name}\" and creation of missing {kind}s is disabled")]
    MissingEntity { kind: EntityKind, name: String },

    /// The Trello API answered with a non-success HTTP status.
    #[error("Trello API returned HTTP {status}: {body}")]
    RemoteApi { status: u16, body: String },

    /// The HTTP request itself failed before a status was obtained.
    #[error("request to Trello API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// No API key/token available from env or the credential store.
    #[error("no Trello credentials configured; run `trello-import auth` or set TRELLO_API_KEY/TRELLO_API_TOKEN")]
    AuthNotConfigured,
}

/// The two parent entity kinds the resolver handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    List,
    Label,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::List => write!(f, "list"),
            EntityKind::Label => write!(f, "label"),
        }
    }
}
