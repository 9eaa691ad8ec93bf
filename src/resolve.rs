//! Entity resolution: the reconciliation core.
//!
//! Given the distinct entity names an import needs, fetch what the board
//! already has once, create whatever is missing (subject to the creation
//! policy), and hand back a name→id lookup table covering both.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::client::TrelloApi;
use crate::config::CreationPolicy;
use crate::error::{EntityKind, ImportError};
use crate::pace::{Pacer, LABEL_CREATE_DELAY, LIST_CREATE_DELAY};
use crate::progress::ProgressSink;

/// Name→remote-id lookup, built fresh each run from existing entities plus
/// any created during resolution.
pub type NameToId = HashMap<String, String>;

/// Result of resolving one entity kind: the lookup table plus the names that
/// had to be created, in creation order.
#[derive(Debug, Default)]
pub struct Resolution {
    pub map: NameToId,
    pub created: Vec<String>,
}

/// Resolves the required list names for the board.
///
/// Fails with [`ImportError::MissingEntity`] before issuing any create if a
/// list is absent and the policy forbids creating lists.
pub async fn resolve_lists(
    api: &dyn TrelloApi,
    board_id: &str,
    required: &[String],
    policy: &CreationPolicy,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
) -> Result<Resolution, ImportError> {
    resolve_entities(
        api,
        board_id,
        required,
        EntityKind::List,
        policy.create_missing_lists,
        pacer,
        sink,
    )
    .await
}

/// Resolves the required label names for the board.
///
/// When the policy skips label handling entirely, performs no fetch or
/// creation and returns an empty map; downstream card creation then drops
/// every label reference silently.
pub async fn resolve_labels(
    api: &dyn TrelloApi,
    board_id: &str,
    required: &[String],
    policy: &CreationPolicy,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
) -> Result<Resolution, ImportError> {
    if policy.skip_labels {
        info!("Label handling disabled, skipping label resolution");
        return Ok(Resolution::default());
    }
    resolve_entities(
        api,
        board_id,
        required,
        EntityKind::Label,
        policy.create_missing_labels,
        pacer,
        sink,
    )
    .await
}

/// Shared algorithm for both entity kinds: one fetch, diff against the
/// required names in first-requested order, create the missing ones.
///
/// Duplicate remote names collapse first-match-wins: the earliest entity in
/// the board's listing order keeps the slot.
async fn resolve_entities(
    api: &dyn TrelloApi,
    board_id: &str,
    required: &[String],
    kind: EntityKind,
    allow_create: bool,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
) -> Result<Resolution, ImportError> {
    let existing = match kind {
        EntityKind::List => api.list_lists(board_id).await?,
        EntityKind::Label => api.list_labels(board_id).await?,
    };

    let mut resolution = Resolution::default();
    for entity in existing {
        resolution.map.entry(entity.name).or_insert(entity.id);
    }
    debug!(
        kind = %kind,
        existing = resolution.map.len(),
        required = required.len(),
        "Fetched existing entities"
    );

    for name in required {
        if resolution.map.contains_key(name) {
            continue;
        }
        if !allow_create {
            return Err(ImportError::MissingEntity {
                kind,
                name: name.clone(),
            });
        }
        let entity = match kind {
            EntityKind::List => api.create_list(board_id, name).await?,
            EntityKind::Label => api.create_label(board_id, name).await?,
        };
        info!(kind = %kind, name = %name, id = %entity.id, "Created missing entity");
        sink.on_log(&format!("Created {kind}: {name}"));
        resolution.map.insert(name.clone(), entity.id);
        resolution.created.push(name.clone());
        let delay = match kind {
            EntityKind::List => LIST_CREATE_DELAY,
            EntityKind::Label => LABEL_CREATE_DELAY,
        };
        pacer.pace(delay).await;
    }

    Ok(resolution)
}
