//! Reservoir Service - HTTP microservice for daily reservoir readings.
//!
//! Serves paginated, pivoted water level and volume readings for the
//! reservoirs in the static catalog.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CONFIG_PATH` | YAML configuration file | `./config/config.yaml` |
//! | `RESERVOIR__<SECTION>__<KEY>` | Override one config key, e.g. `RESERVOIR__MYSQL__PASSWORD` | None |
//! | `RUST_LOG` | Log filter (e.g., "info", "debug") | Depends on `env` |
//!
//! ## Endpoints
//!
//! - `GET /{prefix}/reservoir/{id}?date_from=&date_to=&page=&per_page=` - Daily readings
//! - `GET /health` - Health check
//! - `GET /api-docs/openapi.json` - OpenAPI document

use std::sync::Arc;

use reservoir::{catalog, SqlReadingStore};
use reservoir_service::{config, logging, router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return Err(e.into());
        }
    };

    logging::init(config.env);

    let reservoirs: Vec<i64> = catalog::all().iter().map(|r| r.id).collect();
    tracing::info!(
        env = ?config.env,
        address = %config.http_server.address,
        route_prefix = %config.http_server.route_prefix,
        reservoirs = ?reservoirs,
        "Starting reservoir service"
    );
    if config.http_server.timeout <= config.http_server.query_timeout {
        tracing::warn!(
            timeout_ms = config.http_server.timeout.as_millis() as u64,
            query_timeout_ms = config.http_server.query_timeout.as_millis() as u64,
            "HTTP timeout does not exceed the query deadline; slow queries will end in 408 instead of 500"
        );
    }

    let store = match SqlReadingStore::connect(&config.mysql).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, storage = ?config.mysql, "Cannot connect to storage");
            return Err(e.into());
        }
    };
    tracing::info!(max_connections = config.mysql.max_connections, "Storage connected");

    let state = Arc::new(AppState::new(store.clone(), config.http_server.query_timeout));
    let app = router(state, &config.http_server);

    let listener = match tokio::net::TcpListener::bind(&config.http_server.address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %config.http_server.address, "Cannot bind");
            store.close().await;
            return Err(e.into());
        }
    };

    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    tracing::info!("Storage closed");

    if let Err(e) = served {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
