use axum::{routing::get, Router};

use crate::modules::audio::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/audio", get(controller::list_audio).post(controller::upsert_audio))
        .route("/api/audio/{language}", get(controller::get_audio))
}
