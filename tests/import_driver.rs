//! End-to-end driver scenarios against a mocked Trello API.

use std::sync::Mutex;

use serde_json::json;

use trello_import::client::{MockTrelloApi, NewCard, RemoteEntity};
use trello_import::config::CreationPolicy;
use trello_import::error::{EntityKind, ImportError};
use trello_import::import::run_import;
use trello_import::pace::NoopPacer;
use trello_import::parse::RawRow;
use trello_import::progress::{Counters, ImportStage, ProgressSink};

const BOARD: &str = "board1";

/// Sink that records everything for assertions.
#[derive(Default)]
struct RecordingSink {
    stages: Mutex<Vec<(ImportStage, Counters)>>,
    logs: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn on_stage(&self, stage: ImportStage, counters: &Counters) {
        self.stages.lock().unwrap().push((stage, *counters));
    }

    fn on_log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }
}

fn entity(id: &str, name: &str) -> RemoteEntity {
    RemoteEntity {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn row(list: &str, card: &str, labels: &str) -> RawRow {
    json!({ "List": list, "Card": card, "Labels": labels })
        .as_object()
        .unwrap()
        .clone()
}

fn allow_all() -> CreationPolicy {
    CreationPolicy::default()
}

#[tokio::test]
async fn scenario_full_creation_chain() {
    // Empty board, both creation policies enabled: one list, two labels and
    // one card referencing all three new ids get created.
    let mut api = MockTrelloApi::new();

    api.expect_list_lists().return_once(|_| Ok(vec![]));
    api.expect_create_list()
        .withf(|board, name| board == BOARD && name == "Todo")
        .return_once(|_, _| Ok(entity("L1", "Todo")));

    api.expect_list_labels().return_once(|_| Ok(vec![]));
    api.expect_create_label()
        .withf(|board, name| board == BOARD && name == "urgent")
        .return_once(|_, _| Ok(entity("LB1", "urgent")));
    api.expect_create_label()
        .withf(|board, name| board == BOARD && name == "bug")
        .return_once(|_, _| Ok(entity("LB2", "bug")));

    api.expect_create_card()
        .withf(|card: &NewCard| {
            card.list_id == "L1"
                && card.name == "Task1"
                && card.label_ids == vec!["LB1".to_string(), "LB2".to_string()]
        })
        .return_once(|_| Ok(entity("C1", "Task1")));

    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "urgent,bug")];
    let report = run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &rows)
        .await
        .expect("import should succeed");

    assert_eq!(report.created_lists, vec!["Todo"]);
    assert_eq!(report.created_labels, vec!["urgent", "bug"]);
    assert_eq!(report.counters.created, 1);
    assert_eq!(report.counters.failed, 0);

    let stages = sink.stages.lock().unwrap();
    assert_eq!(stages.first().unwrap().0, ImportStage::Idle);
    assert_eq!(stages[1].0, ImportStage::Parsing);
    assert_eq!(stages.last().unwrap().0, ImportStage::Done);
    let logs = sink.logs.lock().unwrap();
    assert!(logs.iter().any(|l| l == "Created list: Todo"));
    assert!(logs.iter().any(|l| l == "Created label: urgent"));
}

#[tokio::test]
async fn scenario_missing_list_with_creation_disabled_aborts() {
    let mut api = MockTrelloApi::new();
    api.expect_list_lists().return_once(|_| Ok(vec![]));
    api.expect_create_list().never();
    api.expect_list_labels().never();
    api.expect_create_card().never();

    let policy = CreationPolicy {
        create_missing_lists: false,
        ..allow_all()
    };
    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "urgent")];
    let err = run_import(&api, &NoopPacer, &sink, BOARD, &policy, &rows)
        .await
        .expect_err("import should abort");

    assert!(matches!(
        err,
        ImportError::MissingEntity {
            kind: EntityKind::List,
            ref name
        } if name == "Todo"
    ));
    let stages = sink.stages.lock().unwrap();
    let (stage, counters) = stages.last().unwrap();
    assert_eq!(*stage, ImportStage::Failed);
    assert_eq!(counters.created, 0);
}

#[tokio::test]
async fn scenario_skip_labels_creates_cards_without_labels() {
    let mut api = MockTrelloApi::new();
    api.expect_list_lists()
        .return_once(|_| Ok(vec![entity("L1", "Todo")]));
    // Label handling disabled: no fetch, no creation.
    api.expect_list_labels().never();
    api.expect_create_label().never();
    api.expect_create_card()
        .withf(|card: &NewCard| card.label_ids.is_empty())
        .return_once(|_| Ok(entity("C1", "Task1")));

    let policy = CreationPolicy {
        skip_labels: true,
        ..allow_all()
    };
    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "urgent,bug")];
    let report = run_import(&api, &NoopPacer, &sink, BOARD, &policy, &rows)
        .await
        .expect("import should succeed");
    assert_eq!(report.counters.created, 1);
    assert!(report.created_labels.is_empty());
}

#[tokio::test]
async fn existing_entities_are_not_recreated() {
    // Everything the input needs already exists remotely: zero create calls.
    let mut api = MockTrelloApi::new();
    api.expect_list_lists()
        .return_once(|_| Ok(vec![entity("L1", "Todo")]));
    api.expect_create_list().never();
    api.expect_list_labels()
        .return_once(|_| Ok(vec![entity("LB1", "urgent")]));
    api.expect_create_label().never();
    api.expect_create_card()
        .withf(|card: &NewCard| card.list_id == "L1" && card.label_ids == vec!["LB1".to_string()])
        .return_once(|_| Ok(entity("C1", "Task1")));

    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "urgent")];
    let report = run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &rows)
        .await
        .expect("import should succeed");
    assert!(report.created_lists.is_empty());
    assert!(report.created_labels.is_empty());
}

#[tokio::test]
async fn unresolved_label_names_are_dropped_not_fatal() {
    // With label handling skipped the map is empty, so every label
    // reference on the record is silently dropped at card time.
    let mut api = MockTrelloApi::new();
    api.expect_list_lists()
        .return_once(|_| Ok(vec![entity("L1", "Todo")]));
    api.expect_list_labels().never();
    api.expect_create_card()
        .withf(|card: &NewCard| card.label_ids.is_empty())
        .return_once(|_| Ok(entity("C1", "Task1")));

    let policy = CreationPolicy {
        skip_labels: true,
        ..allow_all()
    };
    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "ghost-label")];
    run_import(&api, &NoopPacer, &sink, BOARD, &policy, &rows)
        .await
        .expect("unresolved labels must not fail the run");
}

#[tokio::test]
async fn first_card_failure_aborts_and_reports_partial_counts() {
    let mut api = MockTrelloApi::new();
    api.expect_list_lists()
        .return_once(|_| Ok(vec![entity("L1", "Todo")]));
    api.expect_list_labels().return_once(|_| Ok(vec![]));

    let calls = Mutex::new(0usize);
    api.expect_create_card().times(2).returning(move |_| {
        let mut n = calls.lock().unwrap();
        *n += 1;
        if *n == 1 {
            Ok(entity("C1", "Task1"))
        } else {
            Err(ImportError::RemoteApi {
                status: 429,
                body: "rate limited".to_string(),
            })
        }
    });

    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", ""), row("Todo", "Task2", ""), row("Todo", "Task3", "")];
    let err = run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &rows)
        .await
        .expect_err("second card must abort the run");

    assert!(matches!(err, ImportError::RemoteApi { status: 429, .. }));
    let stages = sink.stages.lock().unwrap();
    let (stage, counters) = stages.last().unwrap();
    assert_eq!(*stage, ImportStage::Failed);
    assert_eq!(counters.created, 1);
    assert_eq!(counters.failed, 1);
    // Partial state is reported to the operator, not rolled back.
    let logs = sink.logs.lock().unwrap();
    assert!(logs.iter().any(|l| l.contains("after 1 created cards")));
}

#[tokio::test]
async fn zero_valid_records_is_empty_input() {
    let mut api = MockTrelloApi::new();
    api.expect_list_lists().never();

    let sink = RecordingSink::default();
    let rows = vec![row("", "Task1", ""), row("Todo", "", "")];
    let err = run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &rows)
        .await
        .expect_err("all rows invalid");
    assert!(matches!(err, ImportError::EmptyInput));
    let stages = sink.stages.lock().unwrap();
    let (_, counters) = stages.last().unwrap();
    assert_eq!(counters.skipped, 2);
}

#[tokio::test]
async fn empty_row_set_is_empty_input_before_any_network_call() {
    // The soft JSON path (unrecognized shape) hands the driver zero rows.
    let mut api = MockTrelloApi::new();
    api.expect_list_lists().never();

    let sink = RecordingSink::default();
    let err = run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &[])
        .await
        .expect_err("empty input");
    assert!(matches!(err, ImportError::EmptyInput));
}

#[tokio::test]
async fn duplicate_remote_names_resolve_first_match_wins() {
    let mut api = MockTrelloApi::new();
    api.expect_list_lists().return_once(|_| {
        Ok(vec![entity("L-first", "Todo"), entity("L-second", "Todo")])
    });
    api.expect_list_labels().return_once(|_| Ok(vec![]));
    api.expect_create_card()
        .withf(|card: &NewCard| card.list_id == "L-first")
        .return_once(|_| Ok(entity("C1", "Task1")));

    let sink = RecordingSink::default();
    let rows = vec![row("Todo", "Task1", "")];
    run_import(&api, &NoopPacer, &sink, BOARD, &allow_all(), &rows)
        .await
        .expect("import should succeed");
}
