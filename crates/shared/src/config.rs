//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Initial values for new projects (the Settings collaborator).
    #[serde(default)]
    pub defaults: ProjectDefaults,
    /// Whether advisory warnings are promoted to hard caps.
    #[serde(default)]
    pub guards: GuardPolicy,
    /// Calculation cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default commercial terms applied when a project is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectDefaults {
    /// Margin percentage applied on top of the scope subtotal.
    #[serde(default = "default_margin_pct")]
    pub margin_pct: Decimal,
    /// Contingency percentage applied on top of the scope subtotal.
    #[serde(default = "default_contingency_pct")]
    pub contingency_pct: Decimal,
    /// Days until an invoice falls due.
    #[serde(default = "default_payment_terms_days")]
    pub payment_terms_days: u32,
    /// Retention percentage (informational only).
    #[serde(default)]
    pub retention_percent: Decimal,
}

fn default_margin_pct() -> Decimal {
    Decimal::from(18)
}

fn default_contingency_pct() -> Decimal {
    Decimal::from(5)
}

fn default_payment_terms_days() -> u32 {
    14
}

impl Default for ProjectDefaults {
    fn default() -> Self {
        Self {
            margin_pct: default_margin_pct(),
            contingency_pct: default_contingency_pct(),
            payment_terms_days: default_payment_terms_days(),
            retention_percent: Decimal::ZERO,
        }
    }
}

/// Promotes advisory warnings to hard caps.
///
/// Both caps are off by default: over-invoicing and over-matching a commitment are
/// warnings the caller may confirm past.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct GuardPolicy {
    /// Refuse invoices that push the invoiced total above the contract value.
    #[serde(default)]
    pub hard_cap_over_invoice: bool,
    /// Refuse bill lines that exceed a commitment's remaining amount.
    #[serde(default)]
    pub hard_cap_over_match: bool,
}

/// Calculation cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached aggregate sets.
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// Time-to-live for each cached entry, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_capacity() -> u64 {
    256
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "siteledger=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SITELEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
