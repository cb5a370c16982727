//! # Configuration State
//!
//! Application configuration loaded at startup, plus the live pricing
//! policy that `PUT /config/pricing` can change.
//!
//! ## Configuration Sources (lowest to highest priority)
//! 1. Defaults (this file)
//! 2. Config file (`HEARTH_CONFIG`, else `config.toml` in the platform
//!    config directory)
//! 3. Environment variables (`HEARTH_*`)
//!
//! ## Config File
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0:8080"
//!
//! [database]
//! path = "/var/lib/hearth/hearth.db"
//!
//! [store]
//! tenant_id = "00000000-0000-0000-0000-000000000001"
//! name = "Hearth Bistro"
//!
//! [pricing]
//! tax_rate_percent = 5.0
//! service_charge_rate_percent = 5.0
//! tax_inclusive = false
//! currency = "INR"
//! service_charge_order_types = ["dine-in"]
//! tax_on_service_charge = true
//! rounding = "nearest-major"
//! ```
//!
//! ## Thread Safety
//! Everything except pricing is read-only after startup. Pricing sits
//! behind a `RwLock`; orders snapshot it when they open, so a change
//! never reprices an open bill.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use hearth_core::validation::validate_percentage;
use hearth_core::{CoreResult, OrderType, PricingPolicy, Rate, RoundingMode, DEFAULT_TENANT_ID};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default database file name inside the data directory.
const DB_FILE_NAME: &str = "hearth.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Pricing DTO
// =============================================================================

/// Pricing configuration as the admin front-end edits it.
///
/// Rates are percentages here (`5.0` = 5%) and basis points in
/// [`PricingPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub tax_rate_percent: f64,
    pub service_charge_rate_percent: f64,
    pub tax_inclusive: bool,
    pub currency: String,
    #[serde(default = "default_service_charge_order_types")]
    pub service_charge_order_types: Vec<OrderType>,
    #[serde(default = "default_true")]
    pub tax_on_service_charge: bool,
    #[serde(default = "default_rounding")]
    pub rounding: RoundingMode,
}

fn default_service_charge_order_types() -> Vec<OrderType> {
    PricingPolicy::default().service_charge_order_types
}

fn default_true() -> bool {
    true
}

fn default_rounding() -> RoundingMode {
    RoundingMode::NearestMajor
}

impl PricingConfig {
    /// Converts to a validated policy.
    pub fn to_policy(&self) -> CoreResult<PricingPolicy> {
        validate_percentage("taxRatePercent", self.tax_rate_percent)?;
        validate_percentage("serviceChargeRatePercent", self.service_charge_rate_percent)?;

        let mut order_types = self.service_charge_order_types.clone();
        order_types.sort();
        order_types.dedup();

        let policy = PricingPolicy {
            tax_rate: Rate::from_percentage(self.tax_rate_percent),
            service_charge_rate: Rate::from_percentage(self.service_charge_rate_percent),
            service_charge_order_types: order_types,
            tax_inclusive: self.tax_inclusive,
            tax_on_service_charge: self.tax_on_service_charge,
            rounding: self.rounding,
            currency: self.currency.trim().to_uppercase(),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_policy(policy: &PricingPolicy) -> Self {
        PricingConfig {
            tax_rate_percent: policy.tax_rate.percentage(),
            service_charge_rate_percent: policy.service_charge_rate.percentage(),
            tax_inclusive: policy.tax_inclusive,
            currency: policy.currency.clone(),
            service_charge_order_types: policy.service_charge_order_types.clone(),
            tax_on_service_charge: policy.tax_on_service_charge,
            rounding: policy.rounding,
        }
    }
}

// =============================================================================
// Application Config
// =============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,

    /// SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Tenant whose orders and tables this server manages.
    pub tenant_id: String,

    /// Store name (printed on bills).
    pub store_name: String,

    /// Live pricing policy; new orders snapshot it.
    pub pricing: PricingPolicy,
}

impl Default for AppConfig {
    /// Development defaults: localhost, data-dir database, 5% GST,
    /// 5% dine-in service charge, INR.
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: default_database_path(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            store_name: "Hearth Dev Kitchen".to_string(),
            pricing: PricingPolicy::default(),
        }
    }
}

/// `[section]` tables of the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    server: ServerSection,
    database: DatabaseSection,
    store: StoreSection,
    pricing: PricingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerSection {
    bind_addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DatabaseSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StoreSection {
    tenant_id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PricingSection {
    tax_rate_percent: Option<f64>,
    service_charge_rate_percent: Option<f64>,
    tax_inclusive: Option<bool>,
    currency: Option<String>,
    service_charge_order_types: Option<Vec<OrderType>>,
    tax_on_service_charge: Option<bool>,
    rounding: Option<RoundingMode>,
}

impl AppConfig {
    /// Loads configuration from the config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HEARTH_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let file = match &path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "Loaded config file");
                Some((path.as_path(), text))
            }
            None => None,
        };

        AppConfig::from_sources(
            file.as_ref().map(|(path, text)| (*path, text.as_str())),
            |key| std::env::var(key).ok(),
        )
    }

    /// Builds configuration from an optional TOML document and an
    /// environment lookup.
    pub fn from_sources(
        file: Option<(&Path, &str)>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        let mut pricing = PricingConfig::from_policy(&config.pricing);

        if let Some((path, text)) = file {
            let parsed: FileConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            config.apply_file(parsed, &mut pricing);
        }

        config.apply_env(&env, &mut pricing);

        config.pricing = pricing
            .to_policy()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if config.tenant_id.trim().is_empty() {
            return Err(ConfigError::Invalid("tenant id must not be empty".into()));
        }
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig, pricing: &mut PricingConfig) {
        if let Some(addr) = file.server.bind_addr {
            self.bind_addr = addr;
        }
        if let Some(path) = file.database.path {
            self.database_path = path;
        }
        if let Some(tenant_id) = file.store.tenant_id {
            self.tenant_id = tenant_id;
        }
        if let Some(name) = file.store.name {
            self.store_name = name;
        }

        let p = file.pricing;
        if let Some(v) = p.tax_rate_percent {
            pricing.tax_rate_percent = v;
        }
        if let Some(v) = p.service_charge_rate_percent {
            pricing.service_charge_rate_percent = v;
        }
        if let Some(v) = p.tax_inclusive {
            pricing.tax_inclusive = v;
        }
        if let Some(v) = p.currency {
            pricing.currency = v;
        }
        if let Some(v) = p.service_charge_order_types {
            pricing.service_charge_order_types = v;
        }
        if let Some(v) = p.tax_on_service_charge {
            pricing.tax_on_service_charge = v;
        }
        if let Some(v) = p.rounding {
            pricing.rounding = v;
        }
    }

    /// Applies `HEARTH_*` overrides. Unparseable values are logged and ignored.
    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>, pricing: &mut PricingConfig) {
        if let Some(addr) = env("HEARTH_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(path) = env("HEARTH_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(tenant_id) = env("HEARTH_TENANT_ID") {
            self.tenant_id = tenant_id;
        }
        if let Some(name) = env("HEARTH_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(raw) = env("HEARTH_TAX_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(rate) => pricing.tax_rate_percent = rate,
                Err(_) => warn!(value = %raw, "Ignoring unparseable HEARTH_TAX_RATE"),
            }
        }
        if let Some(raw) = env("HEARTH_SERVICE_CHARGE_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(rate) => pricing.service_charge_rate_percent = rate,
                Err(_) => warn!(value = %raw, "Ignoring unparseable HEARTH_SERVICE_CHARGE_RATE"),
            }
        }
        if let Some(raw) = env("HEARTH_TAX_INCLUSIVE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => pricing.tax_inclusive = true,
                "0" | "false" | "no" => pricing.tax_inclusive = false,
                _ => warn!(value = %raw, "Ignoring unparseable HEARTH_TAX_INCLUSIVE"),
            }
        }
        if let Some(currency) = env("HEARTH_CURRENCY") {
            pricing.currency = currency;
        }
    }
}

/// `config.toml` in the platform config directory.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "hearth", "pos").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Database file in the platform data directory.
///
/// - **Linux**: `~/.local/share/hearthpos/hearth.db`
/// - **macOS**: `~/Library/Application Support/com.hearth.pos/hearth.db`
/// - **Windows**: `%APPDATA%\hearth\pos\data\hearth.db`
fn default_database_path() -> PathBuf {
    ProjectDirs::from("com", "hearth", "pos")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

// =============================================================================
// Shared State
// =============================================================================

/// Public view of the configuration (`GET /config`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub tenant_id: String,
    pub store_name: String,
    pub pricing: PricingConfig,
}

/// Shared configuration handle.
#[derive(Debug, Clone)]
pub struct ConfigState {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigState {
    pub fn new(config: AppConfig) -> Self {
        ConfigState {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn view(&self) -> ConfigView {
        let config = self.inner.read().await;
        ConfigView {
            tenant_id: config.tenant_id.clone(),
            store_name: config.store_name.clone(),
            pricing: PricingConfig::from_policy(&config.pricing),
        }
    }

    /// Current pricing policy (the snapshot a new order takes).
    pub async fn pricing(&self) -> PricingPolicy {
        self.inner.read().await.pricing.clone()
    }

    /// Validates and swaps in a new pricing policy.
    pub async fn update_pricing(&self, update: &PricingConfig) -> CoreResult<PricingPolicy> {
        let policy = update.to_policy()?;
        self.inner.write().await.pricing = policy.clone();
        info!(
            tax_bps = policy.tax_rate.bps(),
            service_charge_bps = policy.service_charge_rate.bps(),
            tax_inclusive = policy.tax_inclusive,
            "Pricing policy updated"
        );
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.tenant_id, DEFAULT_TENANT_ID);
        assert_eq!(config.pricing, PricingPolicy::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let toml = r#"
            [server]
            bind_addr = "0.0.0.0:9000"

            [pricing]
            tax_rate_percent = 12.0
            service_charge_order_types = ["dine-in", "takeaway"]
            rounding = "none"
        "#;
        let config = AppConfig::from_sources(
            Some((Path::new("config.toml"), toml)),
            env(&[("HEARTH_TAX_RATE", "18"), ("HEARTH_TAX_INCLUSIVE", "yes")]),
        )
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.pricing.tax_rate.bps(), 1800);
        assert!(config.pricing.tax_inclusive);
        assert_eq!(config.pricing.rounding, RoundingMode::None);
        assert_eq!(
            config.pricing.service_charge_order_types,
            vec![OrderType::DineIn, OrderType::Takeaway]
        );
    }

    #[test]
    fn test_bad_env_value_is_ignored() {
        let config =
            AppConfig::from_sources(None, env(&[("HEARTH_SERVICE_CHARGE_RATE", "ten")])).unwrap();
        assert_eq!(config.pricing.service_charge_rate.bps(), 500);
    }

    #[test]
    fn test_invalid_sources_are_rejected() {
        assert!(matches!(
            AppConfig::from_sources(Some((Path::new("c.toml"), "[pricing]\nbogus = 1")), env(&[])),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AppConfig::from_sources(None, env(&[("HEARTH_TAX_RATE", "140")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_sources(None, env(&[("HEARTH_CURRENCY", "rupees")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_pricing_update_round_trips_through_view() {
        let state = ConfigState::new(AppConfig::default());
        let mut pricing = state.view().await.pricing;
        pricing.service_charge_rate_percent = 10.0;
        pricing.currency = "usd".into();

        let policy = state.update_pricing(&pricing).await.unwrap();
        assert_eq!(policy.service_charge_rate.bps(), 1000);
        assert_eq!(state.pricing().await.currency, "USD");

        pricing.tax_rate_percent = -1.0;
        assert!(state.update_pricing(&pricing).await.is_err());
        assert_eq!(state.pricing().await, policy);
    }
}
