pub mod analyzer;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub use analyzer::{RandomAnalyzer, SkinAnalyzer};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
