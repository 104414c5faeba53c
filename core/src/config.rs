//! Client configuration.

use std::time::Duration;

use crate::error::ApiError;

pub const BASE_URL_ENV: &str = "SHOP_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "SHOP_API_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the remote API, without trailing slash.
    pub base_url: String,
    /// Per-request timeout. `None` leaves timeouts to the network stack.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `SHOP_API_BASE_URL` (required) and `SHOP_API_TIMEOUT_SECS`
    /// (optional) from the environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(BASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{BASE_URL_ENV} is not set")))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "{BASE_URL_ENV} must be an http(s) URL, got {base_url:?}"
            )));
        }
        let mut config = Self::new(base_url.trim());
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{TIMEOUT_ENV} must be a whole number of seconds"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
