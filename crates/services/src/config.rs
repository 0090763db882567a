use std::env;

use lwh_core::currency::{DEFAULT_LOCALE, normalize_locale};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SERVICE_NAME: &str = "service";
pub const DEFAULT_RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const DEFAULT_DB_URL: &str = "sqlite://lwh.sqlite3";

/// Client configuration, read from `LWH_*` environment variables.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Gateway root; account lives at `/api/account`.
    pub api_base_url: Url,
    /// Microservice routed through the gateway under `/services/<name>/`.
    pub service_name: String,
    pub api_token: Option<String>,
    pub rates_url: Url,
    pub locale: String,
    pub db_url: String,
}

impl ClientConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a URL variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_base_url = parse_url(
            "LWH_API_BASE_URL",
            &with_trailing_slash(
                non_empty("LWH_API_BASE_URL")
                    .as_deref()
                    .unwrap_or(DEFAULT_API_BASE_URL),
            ),
        )?;
        let rates_url = parse_url(
            "LWH_RATES_URL",
            non_empty("LWH_RATES_URL").as_deref().unwrap_or(DEFAULT_RATES_URL),
        )?;
        let service_name =
            non_empty("LWH_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.into());
        let api_token = non_empty("LWH_API_TOKEN");
        let db_url = non_empty("LWH_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.into());

        let locale = ["LWH_LOCALE", "LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .find_map(|name| non_empty(name).and_then(|raw| normalize_locale(&raw)))
            .unwrap_or_else(|| DEFAULT_LOCALE.into());

        Ok(Self {
            api_base_url,
            service_name,
            api_token,
            rates_url,
            locale,
            db_url,
        })
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}

// Url::join replaces the last path segment unless the base ends with a slash.
fn with_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}
