//! In-process rate provider for unit tests

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::cache::DEFAULT_TTL;
use crate::core::currency::{CacheStats, CurrencyRateProvider, PairRate, RateError, RateTable};

enum Behavior {
    Rate(f64),
    Fail(RateError),
    Panic,
}

pub(crate) struct StubRateProvider {
    behavior: Behavior,
    rate_calls: AtomicUsize,
    pairs: Mutex<Vec<(String, String)>>,
    cached: Mutex<BTreeSet<String>>,
}

impl StubRateProvider {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            rate_calls: AtomicUsize::new(0),
            pairs: Mutex::new(Vec::new()),
            cached: Mutex::new(BTreeSet::new()),
        }
    }

    pub(crate) fn with_rate(rate: f64) -> Self {
        Self::new(Behavior::Rate(rate))
    }

    pub(crate) fn failing(error: RateError) -> Self {
        Self::new(Behavior::Fail(error))
    }

    pub(crate) fn panicking() -> Self {
        Self::new(Behavior::Panic)
    }

    pub(crate) fn rate_calls(&self) -> usize {
        self.rate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requested_pairs(&self) -> Vec<(String, String)> {
        self.pairs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CurrencyRateProvider for StubRateProvider {
    async fn get_rate(&self, from: &str, to: &str) -> Result<PairRate, RateError> {
        self.rate_calls.fetch_add(1, Ordering::SeqCst);
        self.pairs
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string()));

        match &self.behavior {
            Behavior::Rate(rate) => {
                self.cached.lock().unwrap().insert(format!("{from}-{to}"));
                Ok(PairRate {
                    rate: *rate,
                    last_update: "2024-01-01 00:00:00".to_string(),
                })
            }
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("stub provider exploded"),
        }
    }

    async fn get_all_rates(&self, base: &str) -> Result<RateTable, RateError> {
        match &self.behavior {
            Behavior::Rate(rate) => Ok(RateTable {
                base_code: base.to_string(),
                rates: BTreeMap::from([(base.to_string(), 1.0), ("EUR".to_string(), *rate)]),
                last_update: "2024-01-01 00:00:00".to_string(),
            }),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("stub provider exploded"),
        }
    }

    async fn clear_cache(&self) {
        self.cached.lock().unwrap().clear();
    }

    async fn cache_stats(&self) -> CacheStats {
        CacheStats {
            size: self.cached.lock().unwrap().len(),
            ttl: DEFAULT_TTL,
        }
    }
}
