//! Blacklisting middleware: temporarily gates an inner handler after it
//! returns an all-pairs failure, on the theory that a batch where every
//! pair failed is more likely a rate limit or outage than N independent
//! per-pair problems.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use oracle_core::{FetchResult, OracleError, OriginHandler, Pair};

/// Wraps an inner handler, refusing calls for `duration` after the inner
/// handler returns an error for every pair in a batch.
pub struct BlacklistHandler {
    inner: Arc<dyn OriginHandler>,
    name: &'static str,
    duration: Duration,
    blacklisted_until: Mutex<Option<Instant>>,
}

impl BlacklistHandler {
    /// Wrap `inner`, blacklisting it for `duration` after an all-pairs
    /// failure.
    #[must_use]
    pub fn new(inner: Arc<dyn OriginHandler>, name: &'static str, duration: Duration) -> Self {
        Self { inner, name, duration, blacklisted_until: Mutex::new(None) }
    }

    fn remaining(&self) -> Option<Duration> {
        let mut guard = self.blacklisted_until.lock().expect("blacklist mutex poisoned");
        let now = Instant::now();
        match *guard {
            Some(until) if now < until => Some(until - now),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    fn trip(&self) {
        let mut guard = self.blacklisted_until.lock().expect("blacklist mutex poisoned");
        *guard = Some(Instant::now() + self.duration);
    }
}

#[async_trait]
impl OriginHandler for BlacklistHandler {
    async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
        if let Some(remaining) = self.remaining() {
            tracing::warn!(origin = self.name, remaining_ms = remaining.as_millis(), "origin blacklisted, skipping fetch");
            return pairs
                .iter()
                .map(|&pair| FetchResult {
                    price: zeroed(pair),
                    error: Some(OracleError::origin_fetch(self.name, pair, "temporarily blacklisted")),
                })
                .collect();
        }

        let results = self.inner.fetch(pairs).await;
        if !results.is_empty() && results.iter().all(|r| r.error.is_some()) {
            tracing::warn!(origin = self.name, "all-pairs failure, blacklisting");
            self.trip();
        }
        results
    }
}

fn zeroed(pair: Pair) -> oracle_core::PairPrice {
    oracle_core::PairPrice { pair, price: 0.0, bid: 0.0, ask: 0.0, volume_24h: 0.0, time: chrono::Utc::now() }
}
