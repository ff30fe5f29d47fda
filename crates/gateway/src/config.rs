use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const BASE_URL_VAR: &str = "SKILLTRACK_API_BASE_URL";
pub const TIMEOUT_VAR: &str = "SKILLTRACK_REQUEST_TIMEOUT_SECS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: Url,
    /// Whole-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl GatewayConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `SKILLTRACK_API_BASE_URL` and `SKILLTRACK_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or either value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or either value is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar(BASE_URL_VAR.to_owned()))?;
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    TIMEOUT_VAR.to_owned(),
                    format!("'{raw}' is not a number of seconds"),
                )
            })?;
            if secs > 0 {
                config.timeout = Some(Duration::from_secs(secs));
            }
        }
        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue(BASE_URL_VAR.to_owned(), reason);
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid(format!("'{raw}' is not an http(s) URL")));
    }
    Ok(url)
}
