//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_DATA_DIR` - Directory holding the cart slot file (default: .fittipaldi)
//! - `CART_STORAGE_KEY` - Namespaced storage key (default: fittipald1-cart)
//! - `CART_CURRENCY` - ISO 4217 code used for display (default: ARS)

use std::path::PathBuf;

use fittipaldi_core::CurrencyCode;
use thiserror::Error;

use crate::persistence::DEFAULT_STORAGE_KEY;

const DEFAULT_DATA_DIR: &str = ".fittipaldi";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory for file-backed storage
    pub data_dir: PathBuf,
    /// Key of the cart slot
    pub storage_key: String,
    /// Display currency
    pub currency: CurrencyCode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: CurrencyCode::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or_default = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let data_dir = PathBuf::from(get_or_default("CART_DATA_DIR", DEFAULT_DATA_DIR));
        let storage_key = get_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        let currency = get_or_default("CART_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string()))?;

        Ok(Self {
            data_dir,
            storage_key,
            currency,
        })
    }
}
