use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use prazo_core::store::{TASKS_KEY, parse_registry};
use prazo_core::{
    DeadlineMonitor, KeyValueStore, Lifecycle, MemoryStore, MoveOutcome, ReminderSurface, Stage,
    StorageError, TaskDraft, TaskStore, ValidationError,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid time")
}

fn draft(text: &str, amount: &str, unit: &str) -> TaskDraft {
    TaskDraft {
        text: text.to_string(),
        deadline_date: "2026-03-01".to_string(),
        amount: amount.to_string(),
        unit: unit.to_string(),
    }
}

struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Read {
            key: key.to_string(),
            message: "quota exceeded".to_string(),
        })
    }

    fn set_item(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
            message: "quota exceeded".to_string(),
        })
    }
}

#[test]
fn empty_store_loads_three_empty_stages() {
    let lifecycle = Lifecycle::open(MemoryStore::new());
    for stage in Stage::ALL {
        assert!(lifecycle.registry().stage(stage).is_empty());
    }
}

#[test]
fn create_places_one_record_in_todo_and_persists() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("  Buy milk ", "1", "minutes"), now())
        .expect("valid task");

    assert_eq!(record.text, "Buy milk");
    assert_eq!(record.deadline, now() + TimeDelta::minutes(1));
    assert_eq!(lifecycle.registry().stage(Stage::Todo), &[record.clone()]);
    assert_eq!(lifecycle.registry().len(), 1);

    let raw = lifecycle
        .backend()
        .get_item(TASKS_KEY)
        .expect("read")
        .expect("tasks saved");
    assert!(raw.contains("\"timestamp\":\"2026-03-01T09:30:00.000Z\""));
    assert!(raw.contains("\"deadline\":\"2026-03-01T09:31:00.000Z\""));
    assert!(raw.contains("\"inProgress\":[]"));
}

#[test]
fn invalid_input_creates_nothing() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let err = lifecycle
        .create_task(&draft("", "1", "minutes"), now())
        .expect_err("empty text");
    assert_eq!(err, ValidationError::EmptyText);

    lifecycle
        .create_task(&draft("x", "0", "minutes"), now())
        .expect_err("zero amount");
    assert!(lifecycle.registry().is_empty());
    assert_eq!(
        lifecycle.backend().get_item(TASKS_KEY).expect("read"),
        None
    );
}

#[test]
fn two_moves_reach_completed_with_identical_fields() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Write report", "2", "hours"), now())
        .expect("valid task");

    assert_eq!(
        lifecycle.move_task(record.id, Stage::Todo),
        MoveOutcome::Moved(Stage::InProgress)
    );
    assert_eq!(
        lifecycle.move_task(record.id, Stage::InProgress),
        MoveOutcome::Moved(Stage::Completed)
    );

    let registry = lifecycle.registry();
    assert!(registry.stage(Stage::Todo).is_empty());
    assert!(registry.stage(Stage::InProgress).is_empty());
    assert_eq!(registry.stage(Stage::Completed), &[record]);
}

#[test]
fn move_at_terminal_stage_is_noop() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Ship", "1", "days"), now())
        .expect("valid task");
    lifecycle.move_task(record.id, Stage::Todo);
    lifecycle.move_task(record.id, Stage::InProgress);

    let before = lifecycle.registry().clone();
    assert_eq!(
        lifecycle.move_task(record.id, Stage::Completed),
        MoveOutcome::NoOp
    );
    assert_eq!(lifecycle.registry(), &before);
}

#[test]
fn move_from_wrong_stage_is_noop() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Ship", "1", "days"), now())
        .expect("valid task");
    assert_eq!(
        lifecycle.move_task(record.id, Stage::InProgress),
        MoveOutcome::NoOp
    );
    assert_eq!(lifecycle.registry().stage_of(record.id), Some(Stage::Todo));
}

#[test]
fn remove_is_idempotent() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Call bank", "5", "minutes"), now())
        .expect("valid task");

    lifecycle.remove_task(record.id, Stage::Todo);
    lifecycle.remove_task(record.id, Stage::Todo);
    assert!(lifecycle.registry().is_empty());

    let raw = lifecycle
        .backend()
        .get_item(TASKS_KEY)
        .expect("read")
        .expect("tasks saved");
    assert!(parse_registry(&raw).expect("parse").is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let a = lifecycle
        .create_task(&draft("a", "1", "minutes"), now())
        .expect("a");
    lifecycle
        .create_task(&draft("b", "3", "hours"), now() + TimeDelta::milliseconds(7))
        .expect("b");
    lifecycle
        .create_task(&draft("c", "2", "days"), now() + TimeDelta::seconds(1))
        .expect("c");
    lifecycle.move_task(a.id, Stage::Todo);
    lifecycle.check_deadlines(&mut DeadlineMonitor::default(), now() + TimeDelta::minutes(2));

    let expected = lifecycle.registry().clone();
    let reopened = Lifecycle::open(lifecycle.backend().clone());
    assert_eq!(reopened.registry(), &expected);
}

#[test]
fn legacy_payload_dedupes_on_creation_timestamp() {
    let mut backend = MemoryStore::new();
    backend
        .set_item(
            TASKS_KEY,
            r#"{"todo":[
                {"text":"Buy milk","timestamp":"2026-03-01T09:30:00.000Z","deadline":"2026-03-01T09:31:00.000Z"},
                {"text":"Buy milk","timestamp":"2026-03-01T09:30:00.000Z","deadline":"2026-03-01T09:31:00.000Z"}
            ],"inProgress":[],"completed":[]}"#,
        )
        .expect("seed");

    let lifecycle = Lifecycle::open(backend);
    assert_eq!(lifecycle.registry().stage(Stage::Todo).len(), 1);
}

#[test]
fn unparsable_payload_falls_back_to_empty() {
    let mut backend = MemoryStore::new();
    backend.set_item(TASKS_KEY, "{\"todo\": [").expect("seed");
    let lifecycle = Lifecycle::open(backend);
    assert!(lifecycle.registry().is_empty());
}

#[test]
fn broken_backend_never_surfaces_errors() {
    let mut lifecycle = Lifecycle::open(BrokenStore);
    assert!(lifecycle.registry().is_empty());

    let record = lifecycle
        .create_task(&draft("still works", "1", "minutes"), now())
        .expect("valid task");
    assert_eq!(
        lifecycle.move_task(record.id, Stage::Todo),
        MoveOutcome::Moved(Stage::InProgress)
    );

    let mut store = TaskStore::new(BrokenStore);
    assert!(store.save(lifecycle.registry()).is_err());
}

#[test]
fn overdue_task_notifies_once_and_banner_hides() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Buy milk", "1", "minutes"), now())
        .expect("valid task");

    let mut monitor = DeadlineMonitor::default();
    let mut surface = ReminderSurface::default();

    assert!(lifecycle.check_deadlines(&mut monitor, now() + TimeDelta::seconds(30)).is_empty());

    let tick = now() + TimeDelta::seconds(60);
    let raised = lifecycle.check_deadlines(&mut monitor, tick);
    assert_eq!(raised.len(), 1);
    surface.show(&raised[0], tick);
    assert_eq!(surface.visible(tick), Some("Tarefa \"Buy milk\" está atrasada!"));
    assert_eq!(surface.visible(tick + TimeDelta::seconds(5)), None);

    let (stage, stored) = lifecycle.registry().get(record.id).expect("still present");
    assert_eq!(stage, Stage::Todo);
    assert!(stored.notified);

    for minutes in 2..6 {
        assert!(
            lifecycle
                .check_deadlines(&mut monitor, now() + TimeDelta::minutes(minutes))
                .is_empty()
        );
    }

    let mut reopened = Lifecycle::open(lifecycle.backend().clone());
    let mut fresh_monitor = DeadlineMonitor::default();
    assert!(
        reopened
            .check_deadlines(&mut fresh_monitor, now() + TimeDelta::hours(1))
            .is_empty()
    );
}

#[test]
fn notified_marker_survives_moves() {
    let mut lifecycle = Lifecycle::open(MemoryStore::new());
    let record = lifecycle
        .create_task(&draft("Late", "1", "minutes"), now())
        .expect("valid task");
    let mut monitor = DeadlineMonitor::default();
    assert_eq!(
        lifecycle
            .check_deadlines(&mut monitor, now() + TimeDelta::minutes(5))
            .len(),
        1
    );

    lifecycle.move_task(record.id, Stage::Todo);
    assert!(
        lifecycle
            .check_deadlines(&mut monitor, now() + TimeDelta::minutes(10))
            .is_empty()
    );
}

/// Serves a fixed payload and refuses every write.
struct ReadOnlyStore {
    tasks: String,
}

impl KeyValueStore for ReadOnlyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok((key == TASKS_KEY).then(|| self.tasks.clone()))
    }

    fn set_item(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
            message: "read-only".to_string(),
        })
    }
}

#[test]
fn reload_keeps_notified_marker_when_save_failed() {
    let mut seed = Lifecycle::open(MemoryStore::new());
    let record = seed
        .create_task(&draft("Pay rent", "1", "minutes"), now())
        .expect("valid task");
    let tasks = seed
        .backend()
        .get_item(TASKS_KEY)
        .expect("read")
        .expect("tasks saved");

    let mut lifecycle = Lifecycle::open(ReadOnlyStore { tasks });
    let mut monitor = DeadlineMonitor::new(std::time::Duration::from_secs(60));

    let first = lifecycle.check_deadlines(&mut monitor, now() + TimeDelta::minutes(2));
    assert_eq!(first.len(), 1);

    for minutes in 3..6 {
        lifecycle.reload();
        assert!(
            lifecycle
                .check_deadlines(&mut monitor, now() + TimeDelta::minutes(minutes))
                .is_empty()
        );
    }

    lifecycle.reload();
    let (_, stored) = lifecycle.registry().get(record.id).expect("still present");
    assert!(stored.notified);
}
