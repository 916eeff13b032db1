//! Builder for composing an `OriginHandler` with layered decorators.
//!
//! Layers form an onion around the raw handler, applied in a fixed policy
//! order regardless of the order they were added in:
//!
//! ```text
//! Blacklist (outermost: checks first, trips on failure last)
//!     |
//! Quota (innermost: enforces the call budget)
//!     |
//! Raw handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use oracle_core::OriginHandler;

use crate::blacklist::BlacklistHandler;
use crate::quota::QuotaHandler;

/// Builds a decorated `OriginHandler` around a raw one.
pub struct HandlerBuilder {
    raw: Arc<dyn OriginHandler>,
    name: &'static str,
    blacklist: Option<Duration>,
    quota: Option<(u64, Duration)>,
}

impl HandlerBuilder {
    /// Start building from a raw handler registered under `name`.
    #[must_use]
    pub fn new(name: &'static str, raw: Arc<dyn OriginHandler>) -> Self {
        Self { raw, name, blacklist: None, quota: None }
    }

    /// Blacklist the handler for `duration` after an all-pairs batch failure.
    #[must_use]
    pub const fn with_blacklist(mut self, duration: Duration) -> Self {
        self.blacklist = Some(duration);
        self
    }

    /// Cap the handler at `limit` calls per `window`.
    #[must_use]
    pub const fn with_quota(mut self, limit: u64, window: Duration) -> Self {
        self.quota = Some((limit, window));
        self
    }

    /// Apply the configured layers, innermost first, regardless of the
    /// order `with_*` was called in.
    #[must_use]
    pub fn build(self) -> Arc<dyn OriginHandler> {
        let mut acc = self.raw;
        if let Some((limit, window)) = self.quota {
            acc = Arc::new(QuotaHandler::new(acc, self.name, limit, window));
        }
        if let Some(duration) = self.blacklist {
            acc = Arc::new(BlacklistHandler::new(acc, self.name, duration));
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use oracle_core::{FetchResult, OracleError, Pair};

    struct AlwaysFails;

    #[async_trait]
    impl OriginHandler for AlwaysFails {
        async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
            pairs
                .iter()
                .map(|&pair| FetchResult {
                    price: oracle_core::PairPrice { pair, price: 0.0, bid: 0.0, ask: 0.0, volume_24h: 0.0, time: chrono::Utc::now() },
                    error: Some(OracleError::origin_fetch("x", pair, "boom")),
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn blacklist_wraps_quota_regardless_of_call_order() {
        let built_blacklist_first = HandlerBuilder::new("x", Arc::new(AlwaysFails))
            .with_blacklist(Duration::from_secs(60))
            .with_quota(10, Duration::from_secs(60))
            .build();
        let built_quota_first = HandlerBuilder::new("x", Arc::new(AlwaysFails))
            .with_quota(10, Duration::from_secs(60))
            .with_blacklist(Duration::from_secs(60))
            .build();

        let pair = Pair::new("A", "B").unwrap();
        // First call fails through both regardless of ordering, tripping blacklist.
        let _ = built_blacklist_first.fetch(&[pair]).await;
        let _ = built_quota_first.fetch(&[pair]).await;
        let second_a = built_blacklist_first.fetch(&[pair]).await;
        let second_b = built_quota_first.fetch(&[pair]).await;
        assert!(second_a[0].error.as_ref().unwrap().to_string().contains("blacklisted"));
        assert!(second_b[0].error.as_ref().unwrap().to_string().contains("blacklisted"));
    }
}
