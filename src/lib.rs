//! Municipal issue reporting: reports with photos, comments, votes, and the
//! accounts that own them, served as a JSON API.

pub mod app;
pub mod auth;
pub mod config;
pub mod engagement;
pub mod error;
pub mod photos;
pub mod reports;
pub mod state;
pub mod storage;
pub mod users;
mod validate;

pub use app::{build_app, serve};
pub use error::{AppError, AppResult};
pub use state::AppState;
