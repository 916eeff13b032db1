//! The Origin Handler Set (spec.md §4.A): a uniform `Fetch(pairs) ->
//! results` contract over heterogeneous venues, fanned out in parallel
//! across origins by [`Set`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::error::OracleError;
use crate::types::{FetchResult, Pair};

/// A single external price venue. Implementors must never panic — transport
/// failures are surfaced as `error` on individual results — and must be
/// safe to call concurrently from different call sites, though an
/// individual batch need not be parallelized internally.
#[async_trait]
pub trait OriginHandler: Send + Sync {
    /// Fetch a batch of unique pairs, returning exactly one result per input
    /// pair. Consumers key results by the returned `price.pair`, not by
    /// input order.
    async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult>;
}

/// Maps origin name to handler and fans requests out in parallel.
#[derive(Clone, Default)]
pub struct Set {
    handlers: HashMap<&'static str, Arc<dyn OriginHandler>>,
}

impl Set {
    /// Build an empty `Set`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under `origin`. Registering the same origin twice
    /// replaces the previous handler.
    pub fn register(&mut self, origin: &'static str, handler: Arc<dyn OriginHandler>) {
        self.handlers.insert(origin, handler);
    }

    /// Returns true if `origin` has a registered handler.
    #[must_use]
    pub fn contains(&self, origin: &str) -> bool {
        self.handlers.contains_key(origin)
    }

    /// Fetch every requested origin's pairs in parallel, one round-trip per
    /// origin. Unknown origins yield an `OriginFetchError` attached to every
    /// pair requested under that origin. Honors `cancel`: once cancelled,
    /// in-flight handler calls are left to finish naturally (handlers are
    /// not preemptible), but no new origin calls are started, and the
    /// caller's `Feeder` records one warning per origin that was skipped.
    #[tracing::instrument(name = "oracle_core::origin::set::fetch", skip(self, pairs_by_origin, cancel), fields(origins = pairs_by_origin.len()))]
    pub async fn fetch(
        &self,
        pairs_by_origin: &HashMap<&'static str, Vec<Pair>>,
        cancel: &CancelToken,
    ) -> HashMap<&'static str, Vec<FetchResult>> {
        let mut tasks = Vec::with_capacity(pairs_by_origin.len());
        let mut skipped = Vec::new();

        for (&origin, pairs) in pairs_by_origin {
            if cancel.is_cancelled() {
                skipped.push((origin, pairs.clone()));
                continue;
            }
            let Some(handler) = self.handlers.get(origin).cloned() else {
                tracing::warn!(origin, "fetch requested for unregistered origin");
                let results = pairs
                    .iter()
                    .map(|&pair| FetchResult {
                        price: crate::types::PairPrice {
                            pair,
                            price: 0.0,
                            bid: 0.0,
                            ask: 0.0,
                            volume_24h: 0.0,
                            time: chrono::Utc::now(),
                        },
                        error: Some(OracleError::UnknownOrigin(origin.to_string())),
                    })
                    .collect();
                tasks.push(tokio::spawn(async move { (origin, results) }));
                continue;
            };
            let pairs = pairs.clone();
            tasks.push(tokio::spawn(async move {
                let results = handler.fetch(&pairs).await;
                (origin, results)
            }));
        }

        let mut out = HashMap::with_capacity(tasks.len() + skipped.len());
        for task in tasks {
            match task.await {
                Ok((origin, results)) => {
                    out.insert(origin, results);
                }
                Err(join_err) => {
                    tracing::error!(%join_err, "origin fetch task panicked");
                }
            }
        }
        for (origin, pairs) in skipped {
            let results = pairs
                .into_iter()
                .map(|pair| FetchResult {
                    price: crate::types::PairPrice {
                        pair,
                        price: 0.0,
                        bid: 0.0,
                        ask: 0.0,
                        volume_24h: 0.0,
                        time: chrono::Utc::now(),
                    },
                    error: Some(OracleError::origin_fetch(origin, pair, "cancelled before fetch")),
                })
                .collect();
            out.insert(origin, results);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PairPrice;

    struct EchoHandler;

    #[async_trait]
    impl OriginHandler for EchoHandler {
        async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
            pairs
                .iter()
                .map(|&pair| FetchResult {
                    price: PairPrice {
                        pair,
                        price: 1.0,
                        bid: 0.9,
                        ask: 1.1,
                        volume_24h: 10.0,
                        time: chrono::Utc::now(),
                    },
                    error: None,
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn unknown_origin_yields_error_per_pair() {
        let set = Set::new();
        let pair = Pair::new("BTC", "USD").unwrap();
        let mut req = HashMap::new();
        req.insert("nope", vec![pair]);
        let results = set.fetch(&req, &CancelToken::new()).await;
        let r = &results["nope"][0];
        assert!(matches!(r.error, Some(OracleError::UnknownOrigin(_))));
    }

    #[tokio::test]
    async fn registered_origin_is_fetched_in_parallel_across_origins() {
        let mut set = Set::new();
        set.register("a", Arc::new(EchoHandler));
        set.register("b", Arc::new(EchoHandler));
        let pair = Pair::new("BTC", "USD").unwrap();
        let mut req = HashMap::new();
        req.insert("a", vec![pair]);
        req.insert("b", vec![pair]);
        let results = set.fetch(&req, &CancelToken::new()).await;
        assert_eq!(results.len(), 2);
        assert!(results["a"][0].error.is_none());
        assert!(results["b"][0].error.is_none());
    }
}
