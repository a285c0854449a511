//! Exchange-rate lookup.
//!
//! Rates are best effort: any failure is logged and an empty table is
//! returned, which makes every conversion an identity.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::AppCache;
use crate::tours::RateTable;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Payload of `GET {base_url}/{currency}`.
#[derive(Debug, Deserialize)]
struct RatesPayload {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// HTTP client for the exchange-rate service.
#[derive(Clone)]
pub struct RatesClient {
    http: reqwest::Client,
    base_url: String,
}

impl RatesClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the latest rates for `base` from the service.
    pub async fn fetch_rates(&self, base: &str) -> Result<RateTable, RateError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), base);
        let payload = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RatesPayload>()
            .await?;

        Ok(parse_rates(base, payload.rates))
    }

    /// Cached rate table for `base`, or an empty one if the service fails.
    pub async fn get_rates(&self, cache: &AppCache, base: &str) -> Arc<RateTable> {
        if let Some(cached) = cache.rates.get(base).await {
            debug!("Cache HIT for rates: {}", base);
            return cached;
        }

        debug!("Cache MISS for rates: {}", base);
        match self.fetch_rates(base).await {
            Ok(table) => {
                let table = Arc::new(table);
                cache.rates.insert(base.to_string(), Arc::clone(&table)).await;
                table
            }
            Err(e) => {
                warn!("Failed to fetch exchange rates for {}: {}", base, e);
                Arc::new(RateTable::empty(base))
            }
        }
    }
}

/// Build a rate table, dropping values that are not finite positive numbers.
pub fn parse_rates(base: &str, raw: HashMap<String, f64>) -> RateTable {
    let rates = raw
        .into_iter()
        .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
        .filter_map(|(code, rate)| Decimal::try_from(rate).ok().map(|d| (code, d)))
        .collect();

    RateTable {
        base: base.to_string(),
        rates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rates_keeps_positive_values() {
        let raw: HashMap<String, f64> = [
            ("EUR".to_string(), 0.92),
            ("MVR".to_string(), 15.42),
            ("BAD".to_string(), 0.0),
            ("NEG".to_string(), -1.0),
            ("NAN".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();

        let table = parse_rates("USD", raw);
        assert_eq!(table.base, "USD");
        assert_eq!(table.rates.len(), 2);
        assert_eq!(table.rate("EUR"), Some(dec!(0.92)));
        assert_eq!(table.rate("MVR"), Some(dec!(15.42)));
    }

    #[test]
    fn test_payload_shape() {
        let payload: RatesPayload = serde_json::from_str(
            r#"{"base":"USD","date":"2025-03-01","rates":{"USD":1,"EUR":0.92}}"#,
        )
        .unwrap();
        assert_eq!(payload.rates.len(), 2);
    }

    #[tokio::test]
    async fn test_get_rates_degrades_to_empty_table() {
        // Nothing listens on port 9 locally; the request fails fast.
        let client = RatesClient::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let cache = AppCache::new();

        let table = client.get_rates(&cache, "USD").await;
        assert!(table.is_empty());
        assert_eq!(table.base, "USD");
        // Failures are not cached.
        assert!(cache.rates.get("USD").await.is_none());
    }

    #[tokio::test]
    async fn test_get_rates_serves_cache() {
        let client = RatesClient::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let cache = AppCache::new();
        let table = Arc::new(RateTable::default().with_rate("EUR", dec!(0.5)));
        cache.rates.insert("USD".to_string(), Arc::clone(&table)).await;

        let served = client.get_rates(&cache, "USD").await;
        assert!(Arc::ptr_eq(&served, &table));
    }
}
