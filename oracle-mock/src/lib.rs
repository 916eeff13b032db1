//! Mock `OriginHandler` for CI-safe tests and demos. Returns deterministic
//! data from a static fixture table; a `FAIL`/`TIMEOUT` base symbol
//! triggers a forced failure or an injected latency, mirroring the
//! teacher's mock connector sentinel convention.

use async_trait::async_trait;
use chrono::Utc;
use oracle_core::{FetchResult, OracleError, OriginHandler, Pair, PairPrice};

mod fixtures;

/// A handler backed by an in-memory fixture table, registered under `name`.
pub struct MockHandler {
    name: &'static str,
}

impl MockHandler {
    /// Build a handler that will report itself as `name` in errors.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    fn forced_failure(&self, pair: Pair) -> Option<OracleError> {
        (pair.base_str() == "FAIL").then(|| OracleError::origin_fetch(self.name, pair, "forced failure"))
    }

    fn zeroed(pair: Pair) -> PairPrice {
        PairPrice { pair, price: 0.0, bid: 0.0, ask: 0.0, volume_24h: 0.0, time: Utc::now() }
    }
}

#[async_trait]
impl OriginHandler for MockHandler {
    async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
        let mut out = Vec::with_capacity(pairs.len());
        for &pair in pairs {
            if pair.base_str() == "TIMEOUT" {
                // Brief injected latency; callers with a tighter deadline
                // than this should see a realistic slow-origin path.
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            if let Some(err) = self.forced_failure(pair) {
                out.push(FetchResult { price: Self::zeroed(pair), error: Some(err) });
                continue;
            }
            match fixtures::by_pair(pair) {
                Some((price, bid, ask, volume_24h)) => out.push(FetchResult {
                    price: PairPrice { pair, price, bid, ask, volume_24h, time: Utc::now() },
                    error: None,
                }),
                None => out.push(FetchResult {
                    price: Self::zeroed(pair),
                    error: Some(OracleError::origin_fetch(self.name, pair, "no fixture for pair")),
                }),
            }
        }
        out
    }
}
