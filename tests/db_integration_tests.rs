//! Integration tests for the database layer.
//!
//! These tests verify the task lifecycle operations using an in-memory SQLite
//! database. Tests are organized by functionality.

use taskhold::db::{Database, now_ms};
use taskhold::types::{StatusFilter, TaskQuery, TrashView};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

const OWNER: &str = "user_1";

mod create_tests {
    use super::*;

    #[test]
    fn create_task_defaults_to_active_and_incomplete() {
        let db = setup_db();

        let task = db
            .create_task(OWNER, "Write report", None)
            .expect("Failed to create task");

        assert_eq!(task.owner, OWNER);
        assert_eq!(task.title, "Write report");
        assert!(task.description.is_none());
        assert!(!task.completed);
        assert!(task.deleted_at.is_none());
        assert!(task.created_at > 0);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn create_task_stores_description() {
        let db = setup_db();

        let task = db
            .create_task(OWNER, "Buy milk", Some("2%"))
            .expect("Failed to create task");

        assert_eq!(task.description.as_deref(), Some("2%"));
    }

    #[test]
    fn create_then_list_returns_exactly_one_active_incomplete_row() {
        let db = setup_db();
        db.create_task(OWNER, "Only task", None).unwrap();

        let tasks = db.list_tasks(OWNER, &TaskQuery::default()).unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Only task");
        assert!(!tasks[0].completed);
        assert!(tasks[0].deleted_at.is_none());
    }

    #[test]
    fn each_create_makes_a_new_row() {
        let db = setup_db();
        db.create_task(OWNER, "Same title", None).unwrap();
        db.create_task(OWNER, "Same title", None).unwrap();

        let tasks = db.list_tasks(OWNER, &TaskQuery::default()).unwrap();

        assert_eq!(tasks.len(), 2);
        assert_ne!(tasks[0].id, tasks[1].id);
    }
}

mod toggle_tests {
    use super::*;

    #[test]
    fn toggle_flips_completed() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Flip me", None).unwrap();

        let toggled = db.toggle_complete(OWNER, &task.id).unwrap().unwrap();

        assert!(toggled.completed);
    }

    #[test]
    fn toggle_twice_returns_to_original_state() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Flip me back", None).unwrap();

        db.toggle_complete(OWNER, &task.id).unwrap();
        let toggled = db.toggle_complete(OWNER, &task.id).unwrap().unwrap();

        assert_eq!(toggled.completed, task.completed);
    }

    #[test]
    fn toggle_unknown_id_returns_none() {
        let db = setup_db();

        let result = db.toggle_complete(OWNER, "no-such-task").unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn toggle_works_on_trashed_task() {
        // completed is independent of deleted_at
        let db = setup_db();
        let task = db.create_task(OWNER, "Trashed but done", None).unwrap();
        db.soft_delete(OWNER, &task.id).unwrap();

        let toggled = db.toggle_complete(OWNER, &task.id).unwrap().unwrap();

        assert!(toggled.completed);
        assert!(toggled.deleted_at.is_some());
    }
}

mod trash_tests {
    use super::*;

    #[test]
    fn soft_delete_sets_deleted_at_and_hides_from_active_list() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Trash me", None).unwrap();

        assert!(db.soft_delete(OWNER, &task.id).unwrap());

        let stored = db.get_task(OWNER, &task.id).unwrap().unwrap();
        assert!(stored.deleted_at.is_some());

        let active = db.list_tasks(OWNER, &TaskQuery::default()).unwrap();
        assert!(active.is_empty());

        let trashed = db
            .list_tasks(
                OWNER,
                &TaskQuery {
                    view: TrashView::Trashed,
                    ..TaskQuery::default()
                },
            )
            .unwrap();
        assert_eq!(trashed.len(), 1);
    }

    #[test]
    fn restore_reverses_soft_delete_exactly() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Round trip", None).unwrap();
        db.soft_delete(OWNER, &task.id).unwrap();

        assert!(db.restore(OWNER, &task.id).unwrap());

        let stored = db.get_task(OWNER, &task.id).unwrap().unwrap();
        assert!(stored.deleted_at.is_none());

        let active = db.list_tasks(OWNER, &TaskQuery::default()).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, task.id);
    }

    #[test]
    fn permanent_delete_removes_row_regardless_of_state() {
        let db = setup_db();
        let active = db.create_task(OWNER, "Active", None).unwrap();
        let trashed = db.create_task(OWNER, "Trashed", None).unwrap();
        db.soft_delete(OWNER, &trashed.id).unwrap();

        assert_eq!(db.delete_permanent(OWNER, &active.id).unwrap(), 1);
        assert_eq!(db.delete_permanent(OWNER, &trashed.id).unwrap(), 1);

        assert!(db.get_task(OWNER, &active.id).unwrap().is_none());
        assert!(db.get_task(OWNER, &trashed.id).unwrap().is_none());
    }

    #[test]
    fn permanent_delete_of_missing_row_matches_zero() {
        let db = setup_db();

        let deleted = db.delete_permanent(OWNER, "already-gone").unwrap();

        assert_eq!(deleted, 0);
    }
}

mod ownership_tests {
    use super::*;

    #[test]
    fn tasks_are_invisible_to_other_owners() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Mine", None).unwrap();

        assert!(db.get_task("user_2", &task.id).unwrap().is_none());
        assert!(db.list_tasks("user_2", &TaskQuery::default()).unwrap().is_empty());
    }

    #[test]
    fn mutations_by_other_owners_match_no_rows() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Mine", None).unwrap();

        assert!(db.toggle_complete("user_2", &task.id).unwrap().is_none());
        assert!(!db.soft_delete("user_2", &task.id).unwrap());
        assert!(!db.restore("user_2", &task.id).unwrap());
        assert_eq!(db.delete_permanent("user_2", &task.id).unwrap(), 0);

        // The row is unchanged
        let stored = db.get_task(OWNER, &task.id).unwrap().unwrap();
        assert!(!stored.completed);
        assert!(stored.deleted_at.is_none());
    }
}

mod purge_tests {
    use super::*;

    #[test]
    fn purge_removes_only_rows_trashed_before_cutoff() {
        let db = setup_db();
        let expired = db.create_task(OWNER, "Expired", None).unwrap();
        let recent = db.create_task(OWNER, "Recent", None).unwrap();
        let active = db.create_task(OWNER, "Active", None).unwrap();
        db.soft_delete(OWNER, &expired.id).unwrap();
        db.soft_delete(OWNER, &recent.id).unwrap();

        // Cutoff between the two trash stamps: restore the recent one first,
        // wait, and re-trash it so its deleted_at lands after the cutoff.
        std::thread::sleep(std::time::Duration::from_millis(10));
        let cutoff = now_ms();
        std::thread::sleep(std::time::Duration::from_millis(10));
        db.restore(OWNER, &recent.id).unwrap();
        db.soft_delete(OWNER, &recent.id).unwrap();

        let purged = db.purge_expired(cutoff).unwrap();

        assert_eq!(purged, 1);
        assert!(db.get_task(OWNER, &expired.id).unwrap().is_none());
        assert!(db.get_task(OWNER, &recent.id).unwrap().is_some());
        assert!(db.get_task(OWNER, &active.id).unwrap().is_some());
    }

    #[test]
    fn purge_never_touches_active_rows() {
        let db = setup_db();
        db.create_task(OWNER, "Old but active", None).unwrap();

        // Cutoff far in the future: any trashed row would qualify.
        let purged = db.purge_expired(now_ms() + 1_000_000).unwrap();

        assert_eq!(purged, 0);
        assert_eq!(db.list_tasks(OWNER, &TaskQuery::default()).unwrap().len(), 1);
    }

    #[test]
    fn purge_twice_is_idempotent() {
        let db = setup_db();
        let task = db.create_task(OWNER, "Goner", None).unwrap();
        db.soft_delete(OWNER, &task.id).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let cutoff = now_ms();
        assert_eq!(db.purge_expired(cutoff).unwrap(), 1);
        assert_eq!(db.purge_expired(cutoff).unwrap(), 0);
    }

    #[test]
    fn purge_spans_all_owners() {
        let db = setup_db();
        let a = db.create_task("user_a", "A", None).unwrap();
        let b = db.create_task("user_b", "B", None).unwrap();
        db.soft_delete("user_a", &a.id).unwrap();
        db.soft_delete("user_b", &b.id).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let purged = db.purge_expired(now_ms()).unwrap();

        assert_eq!(purged, 2);
    }
}

mod counts_tests {
    use super::*;

    #[test]
    fn counts_group_by_state() {
        let db = setup_db();
        let done = db.create_task(OWNER, "Done", None).unwrap();
        db.create_task(OWNER, "Open", None).unwrap();
        let trashed = db.create_task(OWNER, "Trashed", None).unwrap();
        db.toggle_complete(OWNER, &done.id).unwrap();
        db.soft_delete(OWNER, &trashed.id).unwrap();

        let counts = db.get_task_counts(OWNER).unwrap();

        assert_eq!(counts.active, 2);
        assert_eq!(counts.incomplete, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.trashed, 1);
    }

    #[test]
    fn counts_are_owner_scoped() {
        let db = setup_db();
        db.create_task(OWNER, "Mine", None).unwrap();

        let counts = db.get_task_counts("user_2").unwrap();

        assert_eq!(counts.active, 0);
        assert_eq!(counts.trashed, 0);
    }

    #[test]
    fn completed_and_trashed_task_counts_as_trashed_only() {
        // The completed/incomplete split covers active rows only; a trashed
        // row lands in the trashed bucket whatever its completion flag.
        let db = setup_db();
        let task = db.create_task(OWNER, "Done then trashed", None).unwrap();
        db.toggle_complete(OWNER, &task.id).unwrap();
        db.soft_delete(OWNER, &task.id).unwrap();

        let counts = db.get_task_counts(OWNER).unwrap();

        assert_eq!(counts.completed, 0);
        assert_eq!(counts.trashed, 1);
    }
}

mod filter_smoke_tests {
    use super::*;

    #[test]
    fn completed_filter_excludes_incomplete_rows() {
        let db = setup_db();
        let done = db.create_task(OWNER, "Done", None).unwrap();
        db.create_task(OWNER, "Open", None).unwrap();
        db.toggle_complete(OWNER, &done.id).unwrap();

        let completed = db
            .list_tasks(
                OWNER,
                &TaskQuery {
                    status: StatusFilter::Completed,
                    ..TaskQuery::default()
                },
            )
            .unwrap();

        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
    }
}
