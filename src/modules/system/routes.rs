use axum::{routing::get, Router};

use crate::modules::system::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(controller::index))
        .route("/api/health", get(controller::health))
}
