//! HTML templates for the web UI.
//!
//! Templates are embedded at compile time using `include_str!`.

/// The home page template with the add-task form and the incomplete list.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// The completed tasks page template.
pub const COMPLETED_TEMPLATE: &str = include_str!("templates/completed.html");

/// The trash page template with the retention policy banner.
pub const TRASH_TEMPLATE: &str = include_str!("templates/trash.html");

/// Shared stylesheet, served at `/static/app.css`.
pub const APP_CSS: &str = include_str!("templates/app.css");

/// Shared client script (confirm dialog, form handling), served at
/// `/static/app.js`.
pub const APP_JS: &str = include_str!("templates/app.js");
