//! Batch coordinator semantics: per-artefact atomicity, best-effort
//! skips, cross-artefact independence, and serialization under contention

use pretty_assertions::assert_eq;
use skein_artefact::{ArtefactId, ArtefactKind, MetaValue};
use skein_mutation::Mutation;
use skein_store::{ArtefactStore, Batch, BatchItem, Engine, EngineError, OpOutcome, Phase};
use skein_test_utils::{BrokenStore, MemStore, TASK_DOC, task_metadata};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn task_id(slug: &str) -> ArtefactId {
    ArtefactId::new(ArtefactKind::Task, slug).unwrap()
}

fn seeded_engine(slugs: &[&str]) -> Engine<MemStore> {
    let store = MemStore::new();
    for slug in slugs {
        store.write(&task_id(slug).rel_path(), TASK_DOC).unwrap();
    }
    Engine::with_store(store, Duration::from_secs(1))
}

fn new_task(description: &str) -> Mutation {
    Mutation::CreateTask {
        description: description.to_string(),
        tags: vec![],
        annotations: vec![],
        section: None,
    }
}

fn bad_status() -> Mutation {
    Mutation::UpdateFrontmatter {
        field: "status".to_string(),
        value: MetaValue::Scalar("bogus".to_string()),
    }
}

#[test]
fn failing_operation_discards_the_whole_group() {
    let engine = seeded_engine(&["a"]);
    let id = task_id("a");

    let report = engine.apply_batch(&Batch::new(vec![
        BatchItem::new(id.clone(), new_task("Valid step")),
        BatchItem::new(id.clone(), bad_status()),
    ]));

    assert!(!report.success);
    assert!(matches!(report.results[0].outcome, OpOutcome::Discarded));
    assert!(matches!(report.results[1].outcome, OpOutcome::Failed { .. }));
    assert_eq!(report.first_failure().unwrap().index, 1);
    // Durable bytes are byte-identical to the pre-batch document.
    assert_eq!(engine.store().snapshot(&id.rel_path()).unwrap(), TASK_DOC);
}

#[test]
fn failure_report_carries_the_violations() {
    let engine = seeded_engine(&["a"]);
    let report = engine.apply_batch(&Batch::single(task_id("a"), bad_status()));

    let OpOutcome::Failed { violations, .. } = &report.results[0].outcome else {
        panic!("expected a failed outcome");
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "status");
}

#[test]
fn other_artefacts_in_the_batch_are_unaffected() {
    let engine = seeded_engine(&["a", "b"]);

    let report = engine.apply_batch(&Batch::new(vec![
        BatchItem::new(task_id("a"), new_task("Lands on a")),
        BatchItem::new(task_id("b"), bad_status()),
    ]));

    assert!(!report.success);
    assert!(matches!(report.results[0].outcome, OpOutcome::Applied));
    assert!(matches!(report.results[1].outcome, OpOutcome::Failed { .. }));

    let a = engine.load(&task_id("a")).unwrap();
    assert!(a.sections().get("Tasks").unwrap().text().contains("Lands on a"));
    assert_eq!(engine.store().snapshot(&task_id("b").rel_path()).unwrap(), TASK_DOC);
}

#[test]
fn same_artefact_operations_apply_in_submission_order() {
    let engine = seeded_engine(&["a"]);
    let id = task_id("a");

    let report = engine.apply_batch(&Batch::new(vec![
        BatchItem::new(id.clone(), new_task("Later checked")),
        BatchItem::new(
            id.clone(),
            Mutation::UpdateTaskStatus {
                description: "Later checked".to_string(),
                done: true,
            },
        ),
    ]));

    assert!(report.success);
    let tasks = engine.load(&id).unwrap();
    assert!(
        tasks
            .sections()
            .get("Tasks")
            .unwrap()
            .text()
            .contains("- [x] Later checked")
    );
}

#[test]
fn best_effort_downgrades_missing_removals() {
    let engine = seeded_engine(&["a"]);
    let id = task_id("a");

    let batch = Batch::new(vec![
        BatchItem::new(
            id.clone(),
            Mutation::RemoveTask {
                description: "Not present".to_string(),
            },
        ),
        BatchItem::new(id.clone(), new_task("Still lands")),
    ])
    .best_effort();

    let report = engine.apply_batch(&batch);
    assert!(report.success);
    assert!(matches!(report.results[0].outcome, OpOutcome::Skipped { .. }));
    assert!(matches!(report.results[1].outcome, OpOutcome::Applied));
    assert!(
        engine
            .load(&id)
            .unwrap()
            .sections()
            .get("Tasks")
            .unwrap()
            .text()
            .contains("Still lands")
    );
}

#[test]
fn without_best_effort_missing_removal_fails_the_group() {
    let engine = seeded_engine(&["a"]);
    let id = task_id("a");

    let report = engine.apply_batch(&Batch::new(vec![
        BatchItem::new(
            id.clone(),
            Mutation::RemoveTask {
                description: "Not present".to_string(),
            },
        ),
        BatchItem::new(id.clone(), new_task("Never lands")),
    ]));

    assert!(!report.success);
    assert!(matches!(report.results[0].outcome, OpOutcome::Failed { .. }));
    assert!(matches!(report.results[1].outcome, OpOutcome::Discarded));
    assert_eq!(engine.store().snapshot(&id.rel_path()).unwrap(), TASK_DOC);
}

#[test]
fn create_and_edit_in_one_batch_write_once() {
    let engine = seeded_engine(&[]);
    let id = task_id("fresh");

    let report = engine.apply_batch(&Batch::new(vec![
        BatchItem::new(
            id.clone(),
            Mutation::CreateArtefact {
                metadata: task_metadata("fresh"),
            },
        ),
        BatchItem::new(id.clone(), new_task("First step")),
    ]));

    assert!(report.success);
    let artefact = engine.load(&id).unwrap();
    assert!(
        artefact
            .sections()
            .get("Tasks")
            .unwrap()
            .text()
            .contains("First step")
    );
}

#[test]
fn edit_on_missing_artefact_reports_not_found() {
    let engine = seeded_engine(&[]);
    let report = engine.apply_batch(&Batch::single(task_id("ghost"), new_task("x")));

    assert!(!report.success);
    let OpOutcome::Failed { message, .. } = &report.results[0].outcome else {
        panic!("expected a failed outcome");
    };
    assert!(message.contains("not found"));
}

#[test]
fn storage_failure_surfaces_and_leaves_document_readable() {
    let store = MemStore::new();
    store.write(&task_id("a").rel_path(), TASK_DOC).unwrap();
    let engine = Engine::with_store(BrokenStore::new(store), Duration::from_secs(1));
    let id = task_id("a");

    let err = engine.apply(&id, new_task("Doomed")).unwrap_err();
    assert!(matches!(err, EngineError::Storage(_)));
    assert_eq!(engine.load(&id).unwrap().render(), TASK_DOC);
}

#[test]
fn concurrent_writers_serialize_without_losing_edits() {
    init_tracing();
    let engine = seeded_engine(&["shared"]);
    let id = task_id("shared");

    const WRITERS: usize = 4;
    const EDITS: usize = 5;
    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let engine = &engine;
            let id = id.clone();
            scope.spawn(move || {
                for edit in 0..EDITS {
                    engine
                        .apply(&id, new_task(&format!("writer {writer} edit {edit}")))
                        .unwrap();
                }
            });
        }
    });

    let artefact = engine.load(&id).unwrap();
    let lines = skein_artefact::parse_tasks(artefact.sections().get("Tasks").unwrap().text());
    // 2 fixture lines plus every concurrent edit; none lost, none doubled.
    assert_eq!(lines.len(), 2 + WRITERS * EDITS);
    assert_eq!(engine.phase(&id), Phase::Idle);
}
