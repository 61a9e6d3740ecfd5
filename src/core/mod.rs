//! Core business logic: currencies, rate caching and conversion

pub mod cache;
pub mod clock;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod log;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for cleaner imports
pub use conversion::{Conversion, ConversionError, ConversionFailure, ConversionResult, Converter};
pub use currency::{CurrencyRateProvider, PairRate, RateError, RateTable};
