//! Currency reference data and the rate provider abstraction

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// A supported currency: ISO-like code, display name and flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

impl Currency {
    const fn new(code: &'static str, name: &'static str, symbol: &'static str) -> Self {
        Self { code, name, symbol }
    }
}

pub const SUPPORTED_CURRENCIES: [Currency; 20] = [
    Currency::new("USD", "US Dollar", "🇺🇸"),
    Currency::new("EUR", "Euro", "🇪🇺"),
    Currency::new("GBP", "Pound Sterling", "🇬🇧"),
    Currency::new("JPY", "Japanese Yen", "🇯🇵"),
    Currency::new("AUD", "Australian Dollar", "🇦🇺"),
    Currency::new("CAD", "Canadian Dollar", "🇨🇦"),
    Currency::new("CHF", "Swiss Franc", "🇨🇭"),
    Currency::new("CNY", "Chinese Yuan", "🇨🇳"),
    Currency::new("SEK", "Swedish Krona", "🇸🇪"),
    Currency::new("NZD", "New Zealand Dollar", "🇳🇿"),
    Currency::new("MXN", "Mexican Peso", "🇲🇽"),
    Currency::new("SGD", "Singapore Dollar", "🇸🇬"),
    Currency::new("HKD", "Hong Kong Dollar", "🇭🇰"),
    Currency::new("NOK", "Norwegian Krone", "🇳🇴"),
    Currency::new("BRL", "Brazilian Real", "🇧🇷"),
    Currency::new("ARS", "Argentine Peso", "🇦🇷"),
    Currency::new("COP", "Colombian Peso", "🇨🇴"),
    Currency::new("CLP", "Chilean Peso", "🇨🇱"),
    Currency::new("PEN", "Peruvian Sol", "🇵🇪"),
    Currency::new("UYU", "Uruguayan Peso", "🇺🇾"),
];

/// Exchange rate for one ordered currency pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRate {
    pub rate: f64,
    /// Provider's last update time, rendered in local time.
    pub last_update: String,
}

/// All rates published for a base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base_code: String,
    pub rates: BTreeMap<String, f64>,
    pub last_update: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub ttl: Duration,
}

/// Failure modes of a rate lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {status}")]
    Http { status: u16 },

    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The provider understood the request but rejected it.
    #[error("{message}")]
    Provider { code: String, message: String },
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<PairRate, RateError>;

    async fn get_all_rates(&self, base: &str) -> Result<RateTable, RateError>;

    async fn clear_cache(&self);

    async fn cache_stats(&self) -> CacheStats;
}
