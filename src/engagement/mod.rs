//! Comments and votes on reports.

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod vote;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::engagement_routes()
}
