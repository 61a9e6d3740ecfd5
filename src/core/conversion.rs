//! Request validation and amount conversion on top of a rate provider

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

use crate::core::currency::{
    CacheStats, Currency, CurrencyRateProvider, RateError, RateTable, SUPPORTED_CURRENCIES,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("amount must be a positive number")]
    InvalidAmount,

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("conversion failed: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
    pub last_update: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionFailure {
    pub error: ConversionError,
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl ConversionFailure {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Success(Conversion),
    Failure(ConversionFailure),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown failure during rate lookup".to_string()
    }
}

pub struct Converter {
    provider: Arc<dyn CurrencyRateProvider>,
    currencies: Vec<Currency>,
}

impl Converter {
    pub fn new(provider: Arc<dyn CurrencyRateProvider>) -> Self {
        Self {
            provider,
            currencies: SUPPORTED_CURRENCIES.to_vec(),
        }
    }

    pub fn is_currency_supported(&self, code: &str) -> bool {
        self.currencies
            .iter()
            .any(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Returns an owned copy of the supported currencies.
    pub fn supported_currencies(&self) -> Vec<Currency> {
        self.currencies.clone()
    }

    /// Converts `amount` from one currency to another.
    ///
    /// Never fails outright: validation errors, provider errors and panics in
    /// the lookup path all come back as [`ConversionResult::Failure`].
    pub async fn convert(&self, from: &str, to: &str, amount: f64) -> ConversionResult {
        let from = from.to_uppercase();
        let to = to.to_uppercase();

        match self.try_convert(&from, &to, amount).await {
            Ok(conversion) => ConversionResult::Success(conversion),
            Err(error) => {
                debug!(%from, %to, amount, %error, "Conversion failed");
                ConversionResult::Failure(ConversionFailure {
                    error,
                    from,
                    to,
                    amount,
                })
            }
        }
    }

    async fn try_convert(
        &self,
        from: &str,
        to: &str,
        amount: f64,
    ) -> Result<Conversion, ConversionError> {
        self.ensure_supported(from)?;
        self.ensure_supported(to)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ConversionError::InvalidAmount);
        }

        let lookup = AssertUnwindSafe(self.provider.get_rate(from, to))
            .catch_unwind()
            .await;
        let pair = match lookup {
            Ok(result) => result?,
            Err(payload) => {
                let msg = panic_message(payload);
                error!(%from, %to, "Rate lookup panicked: {}", msg);
                return Err(ConversionError::Unexpected(msg));
            }
        };

        Ok(Conversion {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            converted_amount: amount * pair.rate,
            rate: pair.rate,
            last_update: pair.last_update,
        })
    }

    fn ensure_supported(&self, code: &str) -> Result<(), ConversionError> {
        if self.is_currency_supported(code) {
            Ok(())
        } else {
            Err(ConversionError::UnsupportedCurrency(code.to_string()))
        }
    }

    /// Fetches every published rate for a supported base currency.
    pub async fn all_rates(&self, base: &str) -> Result<RateTable, ConversionError> {
        let base = base.to_uppercase();
        self.ensure_supported(&base)?;
        Ok(self.provider.get_all_rates(&base).await?)
    }

    pub async fn clear_cache(&self) {
        self.provider.clear_cache().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.provider.cache_stats().await
    }
}
