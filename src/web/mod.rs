//! Web UI HTTP server module.
//!
//! Serves the task pages, the htmx fragment endpoints the pages refresh
//! through, and the scheduled-cleanup entry point.

mod server;
pub mod templates;

pub use server::{WebServer, build_router, serve};
