//! HTTP server implementation for the task tracker UI.
//!
//! This module provides the axum-based HTTP server that serves the task pages
//! and exposes the htmx fragment endpoints plus the scheduled-cleanup entry
//! point.

use axum::{
    Router,
    extract::{Form, Path, Query, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::templates;
use crate::auth::{Identity, IdentityHeader};
use crate::config::Config;
use crate::db::{Database, now_ms};
use crate::error::OpError;
use crate::ops;
use crate::retention::{RetentionTier, retention_status};
use crate::types::{StatusFilter, Task, TaskQuery, TrashView};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct WebServer {
    /// Reference to the task database.
    db: Arc<Database>,
    /// Loaded configuration (identity header, cron token, retention window).
    config: Arc<Config>,
}

impl WebServer {
    /// Create a new server instance.
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl IdentityHeader for WebServer {
    fn identity_header(&self) -> &str {
        &self.config.auth.identity_header
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// Page routes

async fn home_page() -> Html<&'static str> {
    Html(templates::INDEX_TEMPLATE)
}

async fn completed_page() -> Html<&'static str> {
    Html(templates::COMPLETED_TEMPLATE)
}

async fn trash_page() -> Html<&'static str> {
    Html(templates::TRASH_TEMPLATE)
}

async fn app_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], templates::APP_CSS)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        templates::APP_JS,
    )
}

/// Stats API endpoint for htmx - returns HTML fragment with the stat cards.
async fn api_stats(State(state): State<WebServer>, identity: Identity) -> Html<String> {
    let counts = match ops::counts(state.db(), identity.user()) {
        Ok(counts) => counts,
        Err(e) => return Html(error_fragment(&e)),
    };

    Html(format!(
        r#"
        <div class="grid grid-stats">
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Open Tasks</div>
            </div>
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Completed</div>
            </div>
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">In Trash</div>
            </div>
        </div>
    "#,
        counts.incomplete, counts.completed, counts.trashed
    ))
}

/// Query parameters for the task list fragment.
#[derive(Debug, serde::Deserialize)]
struct ListParams {
    status: Option<String>,
    view: Option<String>,
    limit: Option<i32>,
}

/// Task list API endpoint for htmx - returns HTML fragment with task rows.
async fn api_tasks_list(
    State(state): State<WebServer>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> Html<String> {
    let query = TaskQuery {
        status: params
            .status
            .as_deref()
            .map(StatusFilter::parse)
            .unwrap_or_default(),
        view: params
            .view
            .as_deref()
            .map(TrashView::parse)
            .unwrap_or_default(),
        limit: params.limit.map(|l| l.clamp(1, 100)),
    };

    let tasks = match ops::list(state.db(), identity.user(), &query) {
        Ok(tasks) => tasks,
        Err(e) => return Html(error_fragment(&e)),
    };

    if tasks.is_empty() {
        return Html(format!(
            r#"<div class="empty-state">{}</div>"#,
            empty_state_message(&query)
        ));
    }

    let now = now_ms();
    let retention_days = state.config().retention.days;
    let mut html = String::from(r#"<div class="task-rows">"#);
    for task in &tasks {
        html.push_str(&render_task_row(task, now, retention_days));
    }
    html.push_str("</div>");
    Html(html)
}

/// Pick the empty-state copy for the current filter combination.
fn empty_state_message(query: &TaskQuery) -> &'static str {
    match (query.view, query.status) {
        (TrashView::Trashed, _) => {
            "Trash is empty. Deleted tasks are kept here for 30 days before being permanently removed."
        }
        (TrashView::Active, StatusFilter::Completed) => {
            "You haven't completed any tasks yet. Keep working!"
        }
        (TrashView::Active, StatusFilter::Incomplete) => {
            "Great job! All your tasks are completed."
        }
        (TrashView::Active, StatusFilter::All) => "No tasks yet. Start by adding your first task.",
    }
}

/// Render one task row fragment.
fn render_task_row(task: &Task, now: i64, retention_days: i64) -> String {
    let title_class = if task.is_trashed() || task.completed {
        "task-title done"
    } else {
        "task-title"
    };

    let description_html = task
        .description
        .as_deref()
        .map(|d| format!(r#"<p class="task-description">{}</p>"#, html_escape(d)))
        .unwrap_or_default();

    let marker_html = if task.is_trashed() {
        r#"<span class="task-marker trashed" title="In trash">&#128465;</span>"#.to_string()
    } else {
        format!(
            r##"<input type="checkbox" class="task-checkbox" {} hx-post="/api/tasks/{}/toggle"
               hx-target="#action-message" hx-swap="innerHTML"
               aria-label="{}">"##,
            if task.completed { "checked" } else { "" },
            html_escape(&task.id),
            if task.completed {
                "Mark as incomplete"
            } else {
                "Mark as complete"
            },
        )
    };

    let meta_html = if let Some(deleted_at) = task.deleted_at {
        let status = retention_status(deleted_at, now, retention_days);
        let tier_class = match status.tier {
            RetentionTier::Imminent => "countdown imminent",
            RetentionTier::Warning => "countdown warning",
            RetentionTier::Notice => "countdown",
        };
        format!(
            r#"<div class="task-meta">
                <span class="badge badge-pending">{} &bull; Deleted</span>
                <span class="{}">{}</span>
            </div>"#,
            if task.completed {
                "Completed"
            } else {
                "Incomplete"
            },
            tier_class,
            status.label(),
        )
    } else {
        String::new()
    };

    let actions_html = if task.is_trashed() {
        format!(
            r##"<div class="task-actions">
                <button class="btn btn-sm" hx-post="/api/tasks/{id}/restore"
                        hx-target="#action-message" hx-swap="innerHTML"
                        title="Restore task">Restore</button>
                <button class="btn btn-danger btn-sm confirm-delete"
                        data-kind="permanent" data-task-id="{id}" data-task-title="{title_attr}"
                        title="Delete permanently">Delete</button>
            </div>"##,
            id = html_escape(&task.id),
            title_attr = html_escape(&task.title),
        )
    } else {
        format!(
            r#"<div class="task-actions">
                <button class="btn btn-danger btn-sm confirm-delete"
                        data-kind="soft" data-task-id="{id}" data-task-title="{title_attr}"
                        title="Move to trash">Delete</button>
            </div>"#,
            id = html_escape(&task.id),
            title_attr = html_escape(&task.title),
        )
    };

    format!(
        r#"<div class="card task-row">
            <div class="task-toggle">{marker}</div>
            <div class="task-body">
                <h3 class="{title_class}">{title}</h3>
                {description}
                {meta}
            </div>
            {actions}
        </div>"#,
        marker = marker_html,
        title_class = title_class,
        title = html_escape(&task.title),
        description = description_html,
        meta = meta_html,
        actions = actions_html,
    )
}

/// Form data for the add-task endpoint.
#[derive(Debug, serde::Deserialize)]
struct AddTaskForm {
    title: Option<String>,
    description: Option<String>,
}

/// Handle the add-task form submission.
async fn api_tasks_add(
    State(state): State<WebServer>,
    identity: Identity,
    Form(form): Form<AddTaskForm>,
) -> Response {
    let title = form.title.unwrap_or_default();
    let result = ops::create(
        state.db(),
        identity.user(),
        &title,
        form.description.as_deref(),
    );

    match result {
        Ok(task) => action_success(
            format!("Added \"{}\"", task.title),
            // task-added tells the form to clear its fields
            "task-changed, task-added",
        ),
        Err(e) => action_failure(&e),
    }
}

/// Toggle completion on a task.
async fn api_task_toggle(
    State(state): State<WebServer>,
    identity: Identity,
    Path(task_id): Path<String>,
) -> Response {
    match ops::toggle_complete(state.db(), identity.user(), &task_id) {
        Ok(task) => action_success(
            format!(
                "\"{}\" marked {}",
                task.title,
                if task.completed {
                    "complete"
                } else {
                    "incomplete"
                }
            ),
            "task-changed",
        ),
        Err(e) => action_failure(&e),
    }
}

/// Move a task to trash.
async fn api_task_delete(
    State(state): State<WebServer>,
    identity: Identity,
    Path(task_id): Path<String>,
) -> Response {
    match ops::soft_delete(state.db(), identity.user(), &task_id) {
        Ok(()) => action_success("Task moved to trash".to_string(), "task-changed"),
        Err(e) => action_failure(&e),
    }
}

/// Restore a trashed task.
async fn api_task_restore(
    State(state): State<WebServer>,
    identity: Identity,
    Path(task_id): Path<String>,
) -> Response {
    match ops::restore(state.db(), identity.user(), &task_id) {
        Ok(()) => action_success("Task restored".to_string(), "task-changed"),
        Err(e) => action_failure(&e),
    }
}

/// Permanently delete a task.
async fn api_task_permanent_delete(
    State(state): State<WebServer>,
    identity: Identity,
    Path(task_id): Path<String>,
) -> Response {
    match ops::delete_permanent(state.db(), identity.user(), &task_id) {
        Ok(()) => action_success("Task permanently deleted".to_string(), "task-changed"),
        Err(e) => action_failure(&e),
    }
}

/// Success response for an action endpoint: a message fragment plus the
/// `HX-Trigger` events that make the page refresh its lists.
fn action_success(message: String, triggers: &'static str) -> Response {
    (
        [(HeaderName::from_static("hx-trigger"), triggers)],
        Html(format!(
            r#"<div class="message message-success">{}</div>"#,
            html_escape(&message)
        )),
    )
        .into_response()
}

/// Failure response for an action endpoint: the structured error message,
/// no refresh trigger.
fn action_failure(error: &OpError) -> Response {
    Html(error_fragment(error)).into_response()
}

fn error_fragment(error: &OpError) -> String {
    format!(
        r#"<div class="message message-error">{}</div>"#,
        html_escape(&error.message)
    )
}

/// Scheduled cleanup entry point.
///
/// Called by an external scheduler on a recurring interval. Responds with a
/// structured JSON outcome either way so a monitoring system can alert on
/// failures; a failed sweep never takes the server down.
async fn api_cron_cleanup(State(state): State<WebServer>, headers: HeaderMap) -> Response {
    if let Some(expected) = &state.config().auth.cron_token {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected);

        if !authorized {
            warn!("Cleanup request rejected: missing or invalid bearer token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "error": "Unauthorized" })),
            )
                .into_response();
        }
    }

    info!("Running scheduled task cleanup");
    match ops::purge_expired(state.db(), state.config().retention.days) {
        Ok(outcome) => Json(json!({
            "success": true,
            "purged": outcome.purged,
            "timestamp": now_ms(),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Scheduled task cleanup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.message,
                    "timestamp": now_ms(),
                })),
            )
                .into_response()
        }
    }
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(state: WebServer) -> Router {
    Router::new()
        // Page routes
        .route("/", get(home_page))
        .route("/completed", get(completed_page))
        .route("/trash", get(trash_page))
        // Static assets
        .route("/static/app.css", get(app_css))
        .route("/static/app.js", get(app_js))
        // htmx fragment routes
        .route("/api/stats", get(api_stats))
        .route("/api/tasks/list", get(api_tasks_list))
        .route("/api/tasks", post(api_tasks_add))
        .route("/api/tasks/{task_id}/toggle", post(api_task_toggle))
        .route("/api/tasks/{task_id}/delete", post(api_task_delete))
        .route("/api/tasks/{task_id}/restore", post(api_task_restore))
        .route("/api/tasks/{task_id}", delete(api_task_permanent_delete))
        // Scheduled cleanup entry point
        .route("/api/cron/cleanup", get(api_cron_cleanup))
        // API routes
        .route("/api/health", get(health))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until interrupted.
pub async fn serve(db: Arc<Database>, config: Arc<Config>) -> anyhow::Result<()> {
    let port = config.server.port;
    let state = WebServer::new(db, config);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Task tracker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down");
}
