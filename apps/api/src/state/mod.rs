//! # State Module
//!
//! Shared state for the HTTP server.
//!
//! ## Multiple State Types
//! `AppState` is only the router's container. Handlers extract the focused
//! piece they need (`State<BillingState>`, `State<ConfigState>`, ...)
//! through `FromRef`, so each signature says exactly what it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Router::with_state(AppState)                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │ FromRef                                  │
//! │     ┌────────────────┬──────┴─────────┬──────────────────┐             │
//! │     ▼                ▼                ▼                  ▼             │
//! │  ┌──────────┐  ┌──────────────┐  ┌─────────────┐  ┌──────────────┐    │
//! │  │ Database │  │ BillingState │  │ ConfigState │  │ SupportState │    │
//! │  │ (pool)   │  │ Arc<Billing  │  │ RwLock<     │  │ Mutex<       │    │
//! │  │          │  │   Service>   │  │  AppConfig> │  │  Sessions>   │    │
//! │  └──────────┘  └──────────────┘  └─────────────┘  └──────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database / repositories: internal connection pool                   │
//! │  • BillingService: stateless; versioned rows guard concurrent writes   │
//! │  • ConfigState: RwLock, written only by PUT /config/pricing            │
//! │  • SupportState: Mutex, shared with the 1s sweeper                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod support;

use std::sync::Arc;

use axum::extract::FromRef;

use hearth_db::{Database, SqliteOrderRepository, SqliteTableRepository};

use crate::service::BillingService;

pub use config::{AppConfig, ConfigError, ConfigState, ConfigView, PricingConfig, DEFAULT_BIND_ADDR};
pub use support::{SupportState, SWEEP_INTERVAL};

/// Billing service over the SQLite repositories.
pub type Billing = BillingService<SqliteOrderRepository, SqliteTableRepository>;

/// Shared handle to the billing service.
pub type BillingState = Arc<Billing>;

/// Router state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub billing: BillingState,
    pub config: ConfigState,
    pub support: SupportState,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let billing = Arc::new(BillingService::new(db.orders(), db.tables()));
        let support = SupportState::new(config.tenant_id.clone());
        AppState {
            db,
            billing,
            config: ConfigState::new(config),
            support,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for BillingState {
    fn from_ref(state: &AppState) -> Self {
        state.billing.clone()
    }
}

impl FromRef<AppState> for ConfigState {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SupportState {
    fn from_ref(state: &AppState) -> Self {
        state.support.clone()
    }
}
