use axum::{extract::State, Json};
use chrono::Utc;
use std::collections::BTreeMap;

use crate::modules::system::schema::{HealthResponse, ServiceDescriptor};
use crate::AppState;

pub async fn index() -> Json<ServiceDescriptor> {
    let endpoints = BTreeMap::from([
        ("/api/audio", "GET - List all audio records; POST - Create or update a record"),
        ("/api/audio/{language}", "GET - Fetch audio URL for specified language"),
        ("/api/health", "GET - Health check"),
    ]);

    Json(ServiceDescriptor {
        message: "Audiodeck API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

/// Always 200. Connectivity reflects the handle established at startup.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        mongodb: if state.is_connected() { "connected" } else { "disconnected" },
        timestamp: Utc::now().to_rfc3339(),
    })
}
