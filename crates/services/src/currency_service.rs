use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use lwh_core::Clock;
use lwh_core::currency::{BASE_CURRENCY, currency_for_locale, format_currency};
use storage::keys;
use storage::kv::{KeyValueStore, read_json, write_json};

use crate::error::RateError;

/// Cached rate tables older than this are ignored.
pub const RATE_CACHE_TTL_MS: i64 = 60 * 60 * 1000;

/// Rates relative to USD, as persisted under the exchange-rate key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateCache {
    pub rates: HashMap<String, f64>,
    /// Unix epoch milliseconds.
    pub last_fetched: i64,
}

impl ExchangeRateCache {
    /// A timestamp from the future, or one too far off to subtract, is stale.
    #[must_use]
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        now_millis
            .checked_sub(self.last_fetched)
            .is_some_and(|age| (0..RATE_CACHE_TTL_MS).contains(&age))
    }

    /// Usable rate for `currency`; zero or NaN count as missing.
    #[must_use]
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates
            .get(currency)
            .copied()
            .filter(|rate| *rate != 0.0 && !rate.is_nan())
    }
}

/// Source of live USD exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest_rates(&self) -> Result<HashMap<String, f64>, RateError>;
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// `RateSource` backed by a keyless JSON endpoint returning `{ "rates": {...} }`.
#[derive(Clone)]
pub struct HttpRateSource {
    client: Client,
    url: Url,
}

impl HttpRateSource {
    #[must_use]
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn latest_rates(&self) -> Result<HashMap<String, f64>, RateError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(RateError::HttpStatus(response.status()));
        }
        let body: LatestRatesResponse = response.json().await?;
        Ok(body.rates.unwrap_or_default())
    }
}

/// Where the active rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateOrigin {
    Base,
    Cache,
    Live,
    Fallback,
}

/// Converts USD prices into the visitor's local currency for display.
#[derive(Debug, Clone)]
pub struct CurrencyResolver {
    locale: String,
    currency: &'static str,
    rate: f64,
    ready: bool,
}

impl CurrencyResolver {
    /// Detect the currency for `locale`. Prices render at rate 1 until
    /// `load_rates` has run.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        let currency = currency_for_locale(&locale);
        Self {
            locale,
            currency,
            rate: 1.0,
            ready: false,
        }
    }

    /// Settle the conversion rate: base currency, fresh cache, then one live
    /// fetch. Never fails; the resolver is ready afterwards in every case.
    pub async fn load_rates(
        &mut self,
        clock: Clock,
        kv: &dyn KeyValueStore,
        source: &dyn RateSource,
    ) -> RateOrigin {
        let (rate, origin) = self.resolve_rate(clock, kv, source).await;
        self.rate = rate;
        self.ready = true;
        tracing::debug!(currency = self.currency, rate, ?origin, "exchange rate settled");
        origin
    }

    async fn resolve_rate(
        &self,
        clock: Clock,
        kv: &dyn KeyValueStore,
        source: &dyn RateSource,
    ) -> (f64, RateOrigin) {
        if self.currency == BASE_CURRENCY {
            return (1.0, RateOrigin::Base);
        }

        let now = clock.now_millis();
        match read_json::<ExchangeRateCache>(kv, keys::EXCHANGE_RATES).await {
            Ok(Some(cache)) if cache.is_fresh(now) => {
                if let Some(rate) = cache.rate_for(self.currency) {
                    return (rate, RateOrigin::Cache);
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(key = keys::EXCHANGE_RATES, error = %err, "ignoring unreadable rate cache");
            }
        }

        match source.latest_rates().await {
            Ok(rates) => {
                let rate = rates.get(self.currency).copied().unwrap_or(1.0);
                let cache = ExchangeRateCache {
                    rates,
                    last_fetched: now,
                };
                if let Err(err) = write_json(kv, keys::EXCHANGE_RATES, &cache).await {
                    tracing::debug!(error = %err, "rate cache not written");
                }
                (rate, RateOrigin::Live)
            }
            Err(err) => {
                tracing::warn!(currency = self.currency, error = %err, "rate fetch failed, showing USD amounts");
                (1.0, RateOrigin::Fallback)
            }
        }
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    #[must_use]
    pub fn currency(&self) -> &'static str {
        self.currency
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Convert a USD amount and format it for the locale, without decimals.
    #[must_use]
    pub fn format_price(&self, usd_amount: f64) -> String {
        format_currency(usd_amount * self.rate, &self.locale, self.currency)
    }

    /// Catalog price label: missing or zero prices read "Free".
    #[must_use]
    pub fn display_price(&self, usd_amount: Option<u64>) -> String {
        match usd_amount {
            None | Some(0) => "Free".to_string(),
            Some(amount) => self.format_price(amount as f64),
        }
    }
}
