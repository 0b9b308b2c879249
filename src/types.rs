//! Core types for the task tracker.

use serde::{Deserialize, Serialize};

/// A task row.
///
/// `deleted_at` is the trash marker: `None` means active, `Some(ts)` records
/// when the task was moved to trash. `completed` is independent of it; a task
/// can be completed-and-trashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

impl Task {
    /// Whether the task currently sits in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Completion filter for the list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// All tasks regardless of completion.
    #[default]
    All,
    /// Only completed tasks.
    Completed,
    /// Only incomplete tasks.
    Incomplete,
}

impl StatusFilter {
    /// Parse a query-string value; unrecognized values fall back to `All`.
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            _ => Self::All,
        }
    }
}

/// Trash filter for the list query: a list shows either active rows or
/// trashed rows, never a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrashView {
    /// Rows with `deleted_at` NULL.
    #[default]
    Active,
    /// Rows with `deleted_at` set.
    Trashed,
}

impl TrashView {
    /// Parse a query-string value; unrecognized values fall back to `Active`.
    pub fn parse(s: &str) -> Self {
        match s {
            "trashed" => Self::Trashed,
            _ => Self::Active,
        }
    }
}

/// Parameters for the owner-scoped list query.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub view: TrashView,
    /// Maximum number of rows to return; `None` means unbounded.
    pub limit: Option<i32>,
}

/// Per-owner task counts for the page stat cards.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskCounts {
    pub active: i64,
    pub incomplete: i64,
    pub completed: i64,
    pub trashed: i64,
}
