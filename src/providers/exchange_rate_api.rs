use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::RateCache;
use crate::core::currency::{CacheStats, CurrencyRateProvider, PairRate, RateError, RateTable};

pub const DEFAULT_BASE_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("fxconv/", env!("CARGO_PKG_VERSION"));

/// Translates an ExchangeRate-API `error-type` into a readable message.
pub fn provider_error_message(code: &str) -> String {
    match code {
        "unsupported-code" => "Unsupported currency code".to_string(),
        "malformed-request" => "Malformed request".to_string(),
        "invalid-key" => "Invalid API key".to_string(),
        "inactive-account" => "Inactive API account".to_string(),
        "quota-reached" => "API quota reached".to_string(),
        other => format!("provider error: {other}"),
    }
}

fn format_unix_timestamp(secs: i64) -> String {
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn transport_error(err: reqwest::Error) -> RateError {
    if err.is_timeout() {
        RateError::Timeout
    } else {
        // The URL carries the API key
        RateError::Connection(err.without_url().to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

impl ApiStatus {
    fn into_error(self) -> Option<RateError> {
        if self.result != "error" {
            return None;
        }
        let code = self.error_type.unwrap_or_else(|| "unknown".to_string());
        Some(RateError::Provider {
            message: provider_error_message(&code),
            code,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    conversion_rate: f64,
    time_last_update_unix: i64,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    base_code: String,
    conversion_rates: BTreeMap<String, f64>,
    time_last_update_unix: i64,
}

/// Client for ExchangeRate-API v6 with a TTL cache on pair lookups.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    cache: Arc<RateCache>,
}

impl ExchangeRateApiProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        cache: Arc<RateCache>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            cache,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RateError> {
        let url = format!("{}/{}/{}", self.base_url, self.api_key, endpoint);
        debug!("Requesting {}/***/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        debug!(%status, "Received ExchangeRate-API response");

        let api_status = serde_json::from_str::<ApiStatus>(&text);
        if !status.is_success() {
            // Rejections usually come with a non-2xx status and an error body
            return Err(api_status
                .ok()
                .and_then(ApiStatus::into_error)
                .unwrap_or(RateError::Http {
                    status: status.as_u16(),
                }));
        }

        let api_status = api_status.map_err(|e| RateError::Parse(e.to_string()))?;
        if let Some(err) = api_status.into_error() {
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| RateError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(name = "PairRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<PairRate, RateError> {
        let key = RateCache::key(from, to);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let data: PairResponse = self.fetch(&format!("pair/{from}/{to}")).await?;
        if !data.conversion_rate.is_finite() || data.conversion_rate <= 0.0 {
            return Err(RateError::Parse(format!(
                "invalid conversion rate {} for {key}",
                data.conversion_rate
            )));
        }

        let rate = PairRate {
            rate: data.conversion_rate,
            last_update: format_unix_timestamp(data.time_last_update_unix),
        };
        self.cache.put(key, rate.clone()).await;
        Ok(rate)
    }

    #[instrument(name = "LatestRatesFetch", skip(self), fields(base = %base))]
    async fn get_all_rates(&self, base: &str) -> Result<RateTable, RateError> {
        let data: LatestResponse = self.fetch(&format!("latest/{base}")).await?;
        Ok(RateTable {
            base_code: data.base_code,
            rates: data.conversion_rates,
            last_update: format_unix_timestamp(data.time_last_update_unix),
        })
    }

    async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
