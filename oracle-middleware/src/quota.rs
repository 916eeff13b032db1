//! Fixed-window quota middleware: rejects a batch outright once the
//! window's call budget is spent, rather than partially serving it.

use std::sync::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use oracle_core::{FetchResult, OracleError, OriginHandler, Pair};

struct Runtime {
    calls_made: u64,
    window_start: Instant,
}

/// Wraps an inner handler, allowing at most `limit` fetch calls per
/// `window`.
pub struct QuotaHandler {
    inner: Arc<dyn OriginHandler>,
    name: &'static str,
    limit: u64,
    window: Duration,
    runtime: Mutex<Runtime>,
}

impl QuotaHandler {
    /// Wrap `inner`, allowing at most `limit` calls per `window`.
    #[must_use]
    pub fn new(inner: Arc<dyn OriginHandler>, name: &'static str, limit: u64, window: Duration) -> Self {
        Self { inner, name, limit, window, runtime: Mutex::new(Runtime { calls_made: 0, window_start: Instant::now() }) }
    }

    fn try_consume(&self) -> bool {
        let mut rt = self.runtime.lock().expect("quota mutex poisoned");
        let now = Instant::now();
        if now.duration_since(rt.window_start) >= self.window {
            rt.calls_made = 0;
            rt.window_start = now;
        }
        if rt.calls_made >= self.limit {
            return false;
        }
        rt.calls_made += 1;
        true
    }
}

#[async_trait]
impl OriginHandler for QuotaHandler {
    async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
        if !self.try_consume() {
            tracing::warn!(origin = self.name, limit = self.limit, "quota exhausted, rejecting batch");
            return pairs
                .iter()
                .map(|&pair| FetchResult {
                    price: oracle_core::PairPrice { pair, price: 0.0, bid: 0.0, ask: 0.0, volume_24h: 0.0, time: chrono::Utc::now() },
                    error: Some(OracleError::origin_fetch(self.name, pair, "quota exhausted for this window")),
                })
                .collect();
        }
        self.inner.fetch(pairs).await
    }
}
