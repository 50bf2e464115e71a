//! Configuration management for LibraSync

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON snapshots. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CirculationConfig {
    pub loan_period_days: u32,
    /// Fine per overdue day, in currency units
    pub daily_fine: Decimal,
    /// Upper bound for a single loan's fine
    pub max_fine: Option<Decimal>,
    pub max_renewals: u32,
    pub require_active_member: bool,
    /// Relabel overdue loans once at startup
    pub overdue_sweep: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Accept any password for accounts without a stored hash (demo data only)
    pub allow_passwordless_login: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeedConfig {
    /// Populate an empty ledger with the demo catalog, roster and loans
    pub demo_data: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub circulation: CirculationConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LIBRASYNC_CIRCULATION__DAILY_FINE=0.25
            .add_source(
                Environment::with_prefix("LIBRASYNC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "storage.data_dir",
                env::var("LIBRASYNC_DATA_DIR").ok(),
            )?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the circulation engine cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.circulation.validate()
    }
}

/// Longest loan period accepted from configuration (ten years)
pub const MAX_LOAN_PERIOD_DAYS: u32 = 3650;

impl CirculationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loan_period_days > MAX_LOAN_PERIOD_DAYS {
            return Err(ConfigError::Message(format!(
                "circulation.loan_period_days must be at most {}, got {}",
                MAX_LOAN_PERIOD_DAYS, self.loan_period_days
            )));
        }
        if self.daily_fine < Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "circulation.daily_fine cannot be negative, got {}",
                self.daily_fine
            )));
        }
        if let Some(cap) = self.max_fine {
            if cap < Decimal::ZERO {
                return Err(ConfigError::Message(format!(
                    "circulation.max_fine cannot be negative, got {}",
                    cap
                )));
            }
        }
        Ok(())
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            daily_fine: Decimal::new(50, 2),
            max_fine: None,
            max_renewals: 2,
            require_active_member: true,
            overdue_sweep: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_passwordless_login: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { demo_data: true }
    }
}
