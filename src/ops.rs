//! Task lifecycle operations.
//!
//! Stateless procedures over the store. Each one takes the caller's resolved
//! identity as an explicit parameter, scopes everything to it, and converts
//! any failure (missing identity, row not found under that identity, store
//! fault) into a structured [`OpError`] at this boundary. The presentation
//! layer only ever sees `OpResult` values.

use crate::auth::UserId;
use crate::db::{Database, now_ms};
use crate::error::{OpError, OpResult};
use crate::retention::purge_cutoff;
use crate::types::{Task, TaskCounts, TaskQuery};
use serde::Serialize;
use tracing::{debug, info};

fn require_user(identity: Option<&UserId>) -> OpResult<&UserId> {
    identity.ok_or_else(OpError::unauthenticated)
}

/// Create a new task for the caller.
///
/// Both fields are trimmed here regardless of what the form sent; a title
/// that is empty after trimming is rejected before any store access, and an
/// empty description is stored as NULL.
pub fn create(
    db: &Database,
    identity: Option<&UserId>,
    title: &str,
    description: Option<&str>,
) -> OpResult<Task> {
    let user = require_user(identity)?;

    let title = title.trim();
    if title.is_empty() {
        return Err(OpError::invalid_title());
    }
    let description = description.map(str::trim).filter(|s| !s.is_empty());

    let task = db.create_task(user.as_str(), title, description)?;
    debug!(task_id = %task.id, "Task created");
    Ok(task)
}

/// Flip the completion flag on the caller's task.
pub fn toggle_complete(db: &Database, identity: Option<&UserId>, task_id: &str) -> OpResult<Task> {
    let user = require_user(identity)?;

    db.toggle_complete(user.as_str(), task_id)?
        .ok_or_else(|| OpError::task_not_found(task_id))
}

/// Move the caller's task to trash.
pub fn soft_delete(db: &Database, identity: Option<&UserId>, task_id: &str) -> OpResult<()> {
    let user = require_user(identity)?;

    if db.soft_delete(user.as_str(), task_id)? {
        Ok(())
    } else {
        Err(OpError::task_not_found(task_id))
    }
}

/// Return the caller's trashed task to the active list.
pub fn restore(db: &Database, identity: Option<&UserId>, task_id: &str) -> OpResult<()> {
    let user = require_user(identity)?;

    if db.restore(user.as_str(), task_id)? {
        Ok(())
    } else {
        Err(OpError::task_not_found(task_id))
    }
}

/// Permanently delete the caller's task.
///
/// Delete-if-matches: a zero-row match is success, so a repeated delete (or
/// one racing the retention sweep) stays idempotent instead of surfacing a
/// spurious failure.
pub fn delete_permanent(db: &Database, identity: Option<&UserId>, task_id: &str) -> OpResult<()> {
    let user = require_user(identity)?;

    let deleted = db.delete_permanent(user.as_str(), task_id)?;
    if deleted == 0 {
        debug!(task_id, "Permanent delete matched no rows");
    }
    Ok(())
}

/// List the caller's tasks matching the query, newest first.
///
/// An empty list is a valid outcome; only store faults produce an error.
pub fn list(db: &Database, identity: Option<&UserId>, query: &TaskQuery) -> OpResult<Vec<Task>> {
    let user = require_user(identity)?;

    Ok(db.list_tasks(user.as_str(), query)?)
}

/// Count the caller's tasks by state.
pub fn counts(db: &Database, identity: Option<&UserId>) -> OpResult<TaskCounts> {
    let user = require_user(identity)?;

    Ok(db.get_task_counts(user.as_str())?)
}

/// Outcome of one retention sweep, reported to the external trigger.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PurgeOutcome {
    /// Number of rows removed.
    pub purged: usize,
    /// Cutoff timestamp the sweep used (epoch milliseconds).
    pub cutoff_ms: i64,
}

/// Remove every trashed row older than the retention window, across all
/// owners. System-triggered; takes no caller identity.
pub fn purge_expired(db: &Database, retention_days: i64) -> OpResult<PurgeOutcome> {
    let cutoff_ms = purge_cutoff(now_ms(), retention_days);
    let purged = db.purge_expired(cutoff_ms)?;

    info!(purged, retention_days, "Retention sweep completed");
    Ok(PurgeOutcome { purged, cutoff_ms })
}
