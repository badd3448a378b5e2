//! notetree server
//!
//! # Layered architecture
//!
//! - `repository`: data access (SQLite stores behind async traits)
//! - `routes`: HTTP surface (axum handlers, error mapping, CORS)
//! - `config` / `logging`: process setup
//!
//! Domain types and validation live in the `notetree-domain` crate.

pub mod config;
pub mod logging;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use config::Config;
use repository::{init_db, CategoryRepository, TodoRepository};
use routes::{build_router, AppState};

/// Open the database and wire the repositories into the router state
pub fn build_state(config: Config) -> anyhow::Result<AppState> {
    let db = init_db(&config.database_path)
        .with_context(|| format!("failed to open database {}", config.database_path.display()))?;

    Ok(AppState {
        categories: Arc::new(CategoryRepository::new(db.connection())),
        todos: Arc::new(TodoRepository::new(db.connection())),
        config: Arc::new(config),
    })
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        host = %config.host,
        port = config.port,
        environment = ?config.environment,
        database = %config.database_path.display(),
        "starting server"
    );
    info!(origins = ?config.cors_origins, "CORS allow-list");

    let addr = config.bind_addr()?;
    let app = build_router(build_state(config)?);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    info!("health check: http://{addr}/health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
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

    info!("shutdown signal received");
}
