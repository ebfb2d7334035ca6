use std::net::SocketAddr;
use std::sync::Arc;

use audiodeck::config::{self, database::DatabaseConfig, settings::ServerConfig};
use audiodeck::store::mongo::MongoStore;
use audiodeck::{router, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ServerConfig::from_env()?;
    config::logging::init(settings.debug);

    let db_config = DatabaseConfig::from_env();
    let state = match MongoStore::open(&db_config).await {
        Ok(store) => {
            tracing::info!(
                database = %db_config.name,
                uri = %db_config.redacted_uri(),
                "Connected to MongoDB"
            );
            AppState::connected(Arc::new(store))
        }
        Err(e) => {
            tracing::error!(error = %e, uri = %db_config.redacted_uri(), "Failed to connect to MongoDB");
            AppState::disconnected()
        }
    };

    if let Some(store) = state.store() {
        match store.count().await {
            Ok(count) => tracing::info!(count, "Database contains audio records"),
            Err(e) => tracing::warn!(error = %e, "Failed to check database"),
        }
    }

    let app = router::create_router(state.clone(), &settings);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        port = settings.port,
        debug = settings.debug,
        environment = %settings.environment,
        "Starting audiodeck API"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = state.store() {
        store.close().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
