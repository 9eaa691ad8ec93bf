//! Import driver: orchestrates normalize → resolve lists → resolve labels →
//! card creation, reporting progress through a [`ProgressSink`].
//!
//! The run is strictly sequential: each stage blocks on its network calls
//! and no two create calls are in flight at once. The first failure aborts
//! the whole run; nothing already created is rolled back, and the final
//! counters reflect the partial state left on the board.

use tracing::{error, info};

use crate::client::{NewCard, TrelloApi};
use crate::config::CreationPolicy;
use crate::error::{EntityKind, ImportError};
use crate::normalize::{normalize, CardRecord};
use crate::pace::{Pacer, CARD_BATCH_DELAY, CARD_BATCH_SIZE};
use crate::parse::RawRow;
use crate::progress::{Counters, ImportStage, ProgressSink};
use crate::resolve::{resolve_labels, resolve_lists, NameToId};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct ImportReport {
    /// Lists created because the board lacked them, in creation order.
    pub created_lists: Vec<String>,
    /// Labels created because the board lacked them, in creation order.
    pub created_labels: Vec<String>,
    pub counters: Counters,
}

/// The working set for one run. Built fresh per invocation, discarded at
/// the end; concurrent runs against the same board are not supported.
struct ImportRun {
    records: Vec<CardRecord>,
    list_map: NameToId,
    label_map: NameToId,
}

/// Runs a full import of `rows` against `board_id`.
///
/// On failure the partial counters are still emitted through the sink so the
/// operator can see how much remote state the aborted run left behind.
pub async fn run_import(
    api: &dyn TrelloApi,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
    board_id: &str,
    policy: &CreationPolicy,
    rows: &[RawRow],
) -> Result<ImportReport, ImportError> {
    let mut counters = Counters::default();
    sink.on_stage(ImportStage::Idle, &counters);
    match drive(api, pacer, sink, board_id, policy, rows, &mut counters).await {
        Ok(report) => {
            sink.on_stage(ImportStage::Done, &report.counters);
            sink.on_log(&format!("Import complete: {} cards.", report.counters.created));
            Ok(report)
        }
        Err(e) => {
            error!(error = %e, created = counters.created, "Import run failed");
            sink.on_stage(ImportStage::Failed, &counters);
            sink.on_log(&format!(
                "Import failed after {} created cards: {e}",
                counters.created
            ));
            Err(e)
        }
    }
}

async fn drive(
    api: &dyn TrelloApi,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
    board_id: &str,
    policy: &CreationPolicy,
    rows: &[RawRow],
    counters: &mut Counters,
) -> Result<ImportReport, ImportError> {
    sink.on_stage(ImportStage::Parsing, counters);
    let records = normalize(rows);
    counters.skipped = rows.len() - records.len();
    if records.is_empty() {
        return Err(ImportError::EmptyInput);
    }
    info!(records = records.len(), skipped = counters.skipped, "Normalized input");

    sink.on_stage(ImportStage::ResolvingLists, counters);
    let list_names = distinct(records.iter().map(|r| r.list.as_str()));
    let lists = resolve_lists(api, board_id, &list_names, policy, pacer, sink).await?;

    sink.on_stage(ImportStage::ResolvingLabels, counters);
    let label_names = distinct(records.iter().flat_map(|r| r.labels.iter().map(String::as_str)));
    let labels = resolve_labels(api, board_id, &label_names, policy, pacer, sink).await?;

    let run = ImportRun {
        records,
        list_map: lists.map,
        label_map: labels.map,
    };

    sink.on_stage(ImportStage::CreatingCards, counters);
    create_cards(api, pacer, sink, &run, counters).await?;

    Ok(ImportReport {
        created_lists: lists.created,
        created_labels: labels.created,
        counters: *counters,
    })
}

async fn create_cards(
    api: &dyn TrelloApi,
    pacer: &dyn Pacer,
    sink: &dyn ProgressSink,
    run: &ImportRun,
    counters: &mut Counters,
) -> Result<(), ImportError> {
    let total = run.records.len();
    for record in &run.records {
        // List resolution aborted earlier if any list was unresolvable;
        // a miss here is a broken invariant, surfaced rather than sent to
        // the API as an empty id.
        let Some(list_id) = run.list_map.get(&record.list).cloned() else {
            counters.failed += 1;
            return Err(ImportError::MissingEntity {
                kind: EntityKind::List,
                name: record.list.clone(),
            });
        };

        // Labels are best-effort: unresolved names are dropped, not fatal.
        let label_ids: Vec<String> = record
            .labels
            .iter()
            .filter_map(|name| run.label_map.get(name).cloned())
            .collect();

        let card = NewCard {
            list_id,
            name: record.card.clone(),
            description: record.description.clone(),
            label_ids,
        };

        match api.create_card(card).await {
            Ok(created) => {
                info!(card = %record.card, id = %created.id, "Created card");
                counters.created += 1;
                sink.on_stage(ImportStage::CreatingCards, counters);
                if counters.created % CARD_BATCH_SIZE == 0 {
                    pacer.pace(CARD_BATCH_DELAY).await;
                }
            }
            Err(e) => {
                counters.failed += 1;
                error!(card = %record.card, error = %e, "Card creation failed, aborting run");
                return Err(e);
            }
        }
    }
    info!(created = counters.created, total, "All cards created");
    Ok(())
}

/// Distinct names in first-seen order.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}
