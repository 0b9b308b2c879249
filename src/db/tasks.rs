//! Task row CRUD and lifecycle queries.
//!
//! Every read and mutation here is scoped to an owner: the `owner` column must
//! match the caller's identity or the row is invisible to the call. The only
//! exception is [`Database::purge_expired`], which the retention sweep runs
//! across all owners.

use super::{Database, now_ms};
use crate::types::{StatusFilter, Task, TaskQuery, TrashView};
use anyhow::Result;
use rusqlite::{Row, params};
use uuid::Uuid;

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        owner: row.get("owner")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: row.get("completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

impl Database {
    /// Insert a new active, incomplete task owned by `owner`.
    pub fn create_task(
        &self,
        owner: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task> {
        let task_id = Uuid::now_v7().to_string();
        let now = now_ms();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, owner, title, description, completed, created_at, updated_at, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, NULL)",
                params![&task_id, owner, title, description, now, now],
            )?;

            Ok(Task {
                id: task_id,
                owner: owner.to_string(),
                title: title.to_string(),
                description: description.map(String::from),
                completed: false,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
        })
    }

    /// Get a task by id, scoped to its owner.
    pub fn get_task(&self, owner: &str, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1 AND owner = ?2")?;

            let result = stmt.query_row(params![task_id, owner], parse_task_row);

            match result {
                Ok(task) => Ok(Some(task)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Flip the `completed` flag on the owner's task.
    /// Returns the updated task, or `None` if no row matched.
    pub fn toggle_complete(&self, owner: &str, task_id: &str) -> Result<Option<Task>> {
        let now = now_ms();

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET completed = NOT completed, updated_at = ?1
                 WHERE id = ?2 AND owner = ?3",
                params![now, task_id, owner],
            )?;

            if updated == 0 {
                return Ok(None);
            }

            let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1 AND owner = ?2")?;
            let task = stmt.query_row(params![task_id, owner], parse_task_row)?;
            Ok(Some(task))
        })
    }

    /// Move the owner's task to trash by stamping `deleted_at`.
    /// Re-deleting an already-trashed task refreshes the stamp, which resets
    /// its retention clock; callers treat both as success.
    pub fn soft_delete(&self, owner: &str, task_id: &str) -> Result<bool> {
        let now = now_ms();

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET deleted_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND owner = ?3",
                params![now, task_id, owner],
            )?;

            Ok(updated > 0)
        })
    }

    /// Clear `deleted_at` on the owner's task, returning it to the active list.
    pub fn restore(&self, owner: &str, task_id: &str) -> Result<bool> {
        let now = now_ms();

        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET deleted_at = NULL, updated_at = ?1
                 WHERE id = ?2 AND owner = ?3",
                params![now, task_id, owner],
            )?;

            Ok(updated > 0)
        })
    }

    /// Delete the owner's task row outright, whatever its state.
    /// Returns the number of rows removed; zero is not an error.
    pub fn delete_permanent(&self, owner: &str, task_id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND owner = ?2",
                params![task_id, owner],
            )?;

            Ok(deleted)
        })
    }

    /// Remove every trashed row, across all owners, whose `deleted_at` is
    /// older than `cutoff_ms`. Active rows are never touched.
    pub fn purge_expired(&self, cutoff_ms: i64) -> Result<usize> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tasks WHERE deleted_at IS NOT NULL AND deleted_at < ?1",
                params![cutoff_ms],
            )?;

            Ok(deleted)
        })
    }

    /// List the owner's tasks matching the query, newest first.
    pub fn list_tasks(&self, owner: &str, query: &TaskQuery) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut sql = String::from("SELECT * FROM tasks WHERE owner = ?");
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            params_vec.push(Box::new(owner.to_string()));

            match query.view {
                TrashView::Active => sql.push_str(" AND deleted_at IS NULL"),
                TrashView::Trashed => sql.push_str(" AND deleted_at IS NOT NULL"),
            }

            match query.status {
                StatusFilter::All => {}
                StatusFilter::Completed => sql.push_str(" AND completed = 1"),
                StatusFilter::Incomplete => sql.push_str(" AND completed = 0"),
            }

            sql.push_str(" ORDER BY created_at DESC");

            if let Some(limit) = query.limit {
                sql.push_str(" LIMIT ?");
                params_vec.push(Box::new(limit));
            }

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(tasks)
        })
    }
}
