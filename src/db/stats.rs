//! Per-owner task counts for the page stat cards.

use super::Database;
use crate::types::TaskCounts;
use anyhow::Result;
use rusqlite::params;

impl Database {
    /// Count the owner's tasks by state in one pass.
    pub fn get_task_counts(&self, owner: &str) -> Result<TaskCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    COUNT(*) FILTER (WHERE deleted_at IS NULL),
                    COUNT(*) FILTER (WHERE deleted_at IS NULL AND completed = 0),
                    COUNT(*) FILTER (WHERE deleted_at IS NULL AND completed = 1),
                    COUNT(*) FILTER (WHERE deleted_at IS NOT NULL)
                 FROM tasks WHERE owner = ?1",
                params![owner],
                |row| {
                    Ok(TaskCounts {
                        active: row.get(0)?,
                        incomplete: row.get(1)?,
                        completed: row.get(2)?,
                        trashed: row.get(3)?,
                    })
                },
            )?;

            Ok(counts)
        })
    }
}
