#![forbid(unsafe_code)]

use ql_core::TaskStatus;
use ql_session::{Session, SessionError, TaskRef};
use ql_storage::SqliteStore;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("ql_session_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_session(storage_dir: &PathBuf, name: &str) -> Session {
    let store = SqliteStore::open(storage_dir).expect("open store");
    Session::login(store, name).expect("login")
}

#[test]
fn login_creates_then_reloads_the_profile() {
    let storage_dir = temp_dir("login_creates_then_reloads_the_profile");

    let mut session = open_session(&storage_dir, "Ada");
    let profile = session.profile().expect("profile");
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.level, 1);
    assert_eq!(profile.setup_state, "pending");

    session.add_task("write report", "hard", "2026-09-01").expect("add");
    session.complete_task(&TaskRef::Id(1)).expect("complete");
    drop(session);

    // Logging in again picks up the persisted progression.
    let session = open_session(&storage_dir, "Ada");
    let profile = session.profile().expect("profile");
    assert_eq!(profile.experience, 3);
    assert_eq!(profile.level, 1);
}

#[test]
fn failed_login_returns_the_store_for_retry() {
    let storage_dir = temp_dir("failed_login_returns_the_store_for_retry");
    let store = SqliteStore::open(&storage_dir).expect("open store");

    let (err, store) = Session::login(store, "   ").expect_err("blank login must fail");
    assert!(matches!(err, SessionError::InvalidName(_)));

    // Re-entry with a corrected name succeeds on the same store handle.
    let session = Session::login(store, "Ada").expect("retry login");
    assert_eq!(session.profile().expect("profile").name, "Ada");
}

#[test]
fn completion_rewards_and_levels_up() {
    let storage_dir = temp_dir("completion_rewards_and_levels_up");
    let mut session = open_session(&storage_dir, "Ada");

    let first = session.add_task("write report", "hard", "2026-09-01").expect("add");
    let second = session.add_task("review code", "hard", "2026-09-02").expect("add");

    let outcome = session.complete_task(&TaskRef::Id(first.id)).expect("complete first");
    assert_eq!(outcome.points, 3);
    assert_eq!(outcome.after.experience, 3);
    assert_eq!(outcome.after.level, 1);
    assert_eq!(outcome.levels_gained, 0);

    let outcome = session.complete_task(&TaskRef::Id(second.id)).expect("complete second");
    assert_eq!(outcome.points, 3);
    assert_eq!(outcome.before.experience, 3);
    assert_eq!(outcome.after.experience, 1);
    assert_eq!(outcome.after.level, 2);
    assert_eq!(outcome.levels_gained, 1);
    assert_eq!(outcome.gold_earned, 20);
    assert_eq!(outcome.task.status, "done");
}

#[test]
fn completion_by_name_resolves_the_first_open_match() {
    let storage_dir = temp_dir("completion_by_name_resolves_the_first_open_match");
    let mut session = open_session(&storage_dir, "Ada");

    let first = session.add_task("laundry", "easy", "2026-09-01").expect("add");
    session.add_task("laundry", "medium", "2026-09-02").expect("add");

    let outcome = session
        .complete_task(&TaskRef::Name("laundry".to_string()))
        .expect("complete by name");
    assert_eq!(outcome.task.id, first.id);
    assert_eq!(outcome.points, 1);

    let err = session
        .complete_task(&TaskRef::Name("dishes".to_string()))
        .expect_err("unknown name must fail");
    assert!(matches!(err, SessionError::TaskNotFound));
}

#[test]
fn invalid_input_leaves_the_ledger_unchanged() {
    let storage_dir = temp_dir("invalid_input_leaves_the_ledger_unchanged");
    let mut session = open_session(&storage_dir, "Ada");

    let err = session
        .add_task("write report", "hard", "31-31-2024")
        .expect_err("invalid date must fail");
    assert!(matches!(err, SessionError::InvalidDate(_)));

    let err = session
        .add_task("write report", "legendary", "2026-09-01")
        .expect_err("invalid difficulty must fail");
    assert!(matches!(err, SessionError::InvalidDifficulty { .. }));

    assert!(session.tasks(TaskStatus::Open).expect("open").is_empty());
}

#[test]
fn update_reshapes_an_open_task() {
    let storage_dir = temp_dir("update_reshapes_an_open_task");
    let mut session = open_session(&storage_dir, "Ada");
    let task = session.add_task("write report", "easy", "2026-09-01").expect("add");

    let updated = session
        .update_task(
            &TaskRef::Id(task.id),
            Some("write the quarterly report"),
            Some("hard"),
            Some("2026-09-15"),
        )
        .expect("update");
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.name, "write the quarterly report");
    assert_eq!(updated.difficulty, "hard");
    assert_eq!(updated.due_date, "2026-09-15");
    assert_eq!(updated.status, "open");

    // The reward follows the edited difficulty.
    let outcome = session.complete_task(&TaskRef::Id(task.id)).expect("complete");
    assert_eq!(outcome.points, 3);

    let err = session
        .update_task(&TaskRef::Id(task.id), Some("too late"), None, None)
        .expect_err("editing a done task must fail");
    assert!(matches!(err, SessionError::TaskNotFound));

    let err = session
        .update_task(&TaskRef::Id(task.id), None, None, Some("31-31-2024"))
        .expect_err("invalid date must fail before any store call");
    assert!(matches!(err, SessionError::InvalidDate(_)));
}

#[test]
fn delete_by_id_and_by_name() {
    let storage_dir = temp_dir("delete_by_id_and_by_name");
    let mut session = open_session(&storage_dir, "Ada");

    let first = session.add_task("laundry", "easy", "2026-09-01").expect("add");
    session.add_task("dishes", "easy", "2026-09-01").expect("add");

    session.delete_task(&TaskRef::Id(first.id)).expect("delete by id");
    session
        .delete_task(&TaskRef::Name("dishes".to_string()))
        .expect("delete by name");
    assert!(session.tasks(TaskStatus::Open).expect("open").is_empty());

    let err = session
        .delete_task(&TaskRef::Id(first.id))
        .expect_err("deleting again must fail");
    assert!(matches!(err, SessionError::TaskNotFound));
}

#[test]
fn finalize_maps_the_one_shot_guard() {
    let storage_dir = temp_dir("finalize_maps_the_one_shot_guard");
    let mut session = open_session(&storage_dir, "Ada");

    let profile = session.finalize_profile("Fighter", "Elf").expect("finalize");
    assert_eq!(profile.class.as_deref(), Some("Fighter"));
    assert_eq!(profile.setup_state, "finalized");

    let err = session
        .finalize_profile("Medic", "Dwarf")
        .expect_err("second finalize must fail");
    assert!(matches!(err, SessionError::ProfileAlreadyFinalized));
}

#[test]
fn history_exposes_the_journal_with_timestamps() {
    let storage_dir = temp_dir("history_exposes_the_journal_with_timestamps");
    let mut session = open_session(&storage_dir, "Ada");
    session.add_task("write report", "hard", "2026-09-01").expect("add");
    session
        .complete_task(&TaskRef::Name("write report".to_string()))
        .expect("complete");

    let history = session.history(None).expect("history");
    let types: Vec<&str> = history.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["profile_created", "task_created", "task_completed", "reward_applied"]
    );
    for event in &history {
        // RFC 3339 timestamps end in a zone designator.
        assert!(event.ts.ends_with('Z'), "ts={}", event.ts);
        assert!(event.payload.is_object());
    }

    // A capped history keeps the newest entries, not the oldest.
    let limited = session.history(Some(2)).expect("limited history");
    let types: Vec<&str> = limited.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(types, vec!["task_completed", "reward_applied"]);
}
