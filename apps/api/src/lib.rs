//! # Hearth API Library
//!
//! HTTP server for the Hearth restaurant POS: orders, bills, payments,
//! settlement and the table floor.
//!
//! ## Module Organization
//! ```text
//! hearth_api/
//! ├── lib.rs          ◄─── You are here (startup, router, shutdown)
//! ├── error.rs        ◄─── ApiError → JSON error body + status
//! ├── service.rs      ◄─── BillingService (orders ⇄ tables orchestration)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState + FromRef substates
//! │   ├── config.rs   ◄─── Layered config, live pricing policy
//! │   └── support.rs  ◄─── Support sessions + expiry sweeper
//! └── routes/
//!     ├── mod.rs      ◄─── build_router, ApiJson / ApiQuery extractors
//!     ├── orders.rs   ◄─── /orders/...
//!     ├── tables.rs   ◄─── /tables/...
//!     ├── support.rs  ◄─── /support/sessions/...
//!     ├── reports.rs  ◄─── /reports/daily
//!     ├── config.rs   ◄─── /config
//!     └── health.rs   ◄─── /health
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter (RUST_LOG)                     │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → config.toml → HEARTH_* env                            │
//! │                                                                         │
//! │  3. Connect to Database ──────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  4. Build State + Router ─────────────────────────────────────────────► │
//! │     • BillingService over the SQLite repositories                       │
//! │     • Support session sweeper (every 1s)                                │
//! │                                                                         │
//! │  5. Serve until Ctrl+C / SIGTERM, then close the pool                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod routes;
pub mod service;
pub mod state;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hearth_db::{Database, DbConfig};
use state::{AppConfig, AppState, SWEEP_INTERVAL};

/// Path that selects an in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

/// Builds the application: every route, the tower layers and the state.
///
/// Used by the server and by the HTTP tests.
pub fn build_app(state: AppState) -> Router {
    routes::build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the server until a shutdown signal arrives.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Hearth POS API");

    let config = AppConfig::load()?;

    let db_config = if config.database_path.as_os_str() == IN_MEMORY_PATH {
        DbConfig::in_memory()
    } else {
        if let Some(dir) = config.database_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        DbConfig::new(config.database_path.clone())
    };
    let db_config = db_config.tenant_id(config.tenant_id.clone());

    info!(path = %config.database_path.display(), "Connecting to database");
    let db = Database::new(db_config).await?;
    info!("Database connected and migrations applied");

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(db.clone(), config);
    let sweeper = state.support.spawn_sweeper(SWEEP_INTERVAL);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=hearth_api=trace` - Trace the API crate only
/// - Default: `info,hearth=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hearth=debug,sqlx=warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
