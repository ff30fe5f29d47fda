//! Runtime configuration for the `skilltrack` binary.
//!
//! Values come from the environment (and a `.env` file outside tests), with
//! command-line flags taking precedence.

use gateway::config::BASE_URL_VAR;
use gateway::{ConfigError, GatewayConfig};
use tracing_subscriber::EnvFilter;

pub const TOKEN_VAR: &str = "SKILLTRACK_ID_TOKEN";
pub const LOG_VAR: &str = "RUST_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Flag values that replace their environment counterparts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub gateway: GatewayConfig,
    /// ID token issued by the identity provider's session.
    pub id_token: Option<String>,
    /// `EnvFilter` directives, e.g. `skilltrack=debug,reqwest=warn`.
    pub log_filter: String,
}

impl Config {
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or any value is malformed.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or any value is malformed.
    pub fn from_lookup(
        overrides: &Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let gateway = GatewayConfig::from_lookup(|key| {
            if key == BASE_URL_VAR {
                overrides.base_url.clone().or_else(|| lookup(key))
            } else {
                lookup(key)
            }
        })?;

        let id_token = overrides
            .token
            .clone()
            .or_else(|| lookup(TOKEN_VAR))
            .filter(|t| !t.trim().is_empty());

        let log_filter = lookup(LOG_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        EnvFilter::try_new(&log_filter).map_err(|e| {
            ConfigError::InvalidValue(LOG_VAR.to_owned(), format!("'{log_filter}': {e}"))
        })?;

        Ok(Self {
            gateway,
            id_token,
            log_filter,
        })
    }
}
