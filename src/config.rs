//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the odds provider API key) are referenced by env-var name in
//! the config and resolved at runtime via `std::env::var`. Every section
//! has defaults, so a partial file is still a valid config.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::types::BetdeskError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub odds_api: OddsApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite:data/betdesk.db` or `sqlite::memory:`.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/betdesk.db".to_string(),
        }
    }
}

/// Fee rates snapshotted onto every bet at placement time.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeeConfig {
    /// Fraction of the stake charged when the bet is placed.
    pub placement_rate: Decimal,
    /// Fraction of winnings reserved for settlement. Recorded, not applied.
    pub win_fee_rate: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            placement_rate: dec!(0.02),
            win_fee_rate: dec!(0.05),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsApiConfig {
    pub base_url: String,
    /// Name of the env var holding the provider API key.
    pub api_key_env: String,
    pub regions: String,
    pub markets: String,
    pub odds_format: String,
    pub timeout_secs: u64,
    /// Sports queried when `/events` is called without `?sports=`.
    pub default_sports: Vec<String>,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            api_key_env: "ODDS_API_KEY".to_string(),
            regions: "us".to_string(),
            markets: "h2h".to_string(),
            odds_format: "decimal".to_string(),
            timeout_secs: 15,
            default_sports: vec![
                "basketball_nba".to_string(),
                "baseball_mlb".to_string(),
                "soccer_epl".to_string(),
            ],
        }
    }
}

impl OddsApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the service cannot work with.
    pub fn validate(&self) -> Result<(), BetdeskError> {
        let unit = Decimal::ZERO..=Decimal::ONE;
        if !unit.contains(&self.fees.placement_rate) {
            return Err(BetdeskError::Config(format!(
                "fees.placement_rate must be within [0, 1], got {}",
                self.fees.placement_rate
            )));
        }
        if !unit.contains(&self.fees.win_fee_rate) {
            return Err(BetdeskError::Config(format!(
                "fees.win_fee_rate must be within [0, 1], got {}",
                self.fees.win_fee_rate
            )));
        }
        if self.odds_api.timeout_secs == 0 {
            return Err(BetdeskError::Config(
                "odds_api.timeout_secs must be positive".to_string(),
            ));
        }
        if self.odds_api.default_sports.is_empty() {
            return Err(BetdeskError::Config(
                "odds_api.default_sports must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
