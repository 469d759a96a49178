//! Report lifecycle: creation with photos, detail view, feed, search, deletion.

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod search;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use search::ReportFilter;

pub fn router() -> Router<AppState> {
    handlers::report_routes()
}
