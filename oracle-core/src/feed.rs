//! The Feeder (spec.md §4.D): batches a DAG's leaves by origin, fetches
//! only the ones stale enough to need refreshing, and ingests results back
//! into the graph without clobbering a still-valid price on fetch failure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::error::OracleError;
use crate::node::Node;
use crate::origin::Set;
use crate::types::{OriginPrice, Pair};
use crate::walk;

/// Every non-fatal issue collected while feeding one batch, in the order
/// encountered.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Warnings(Vec<OracleError>);

impl Warnings {
    /// An empty warnings list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one warning.
    pub fn push(&mut self, err: OracleError) {
        self.0.push(err);
    }

    /// Returns true if no warnings were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of collected warnings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the collected warnings.
    #[must_use]
    pub fn as_slice(&self) -> &[OracleError] {
        &self.0
    }

    /// Fold the collected warnings into a single error: `None` if empty,
    /// the warning itself if there is exactly one, or `OracleError::Multiple`
    /// if there is more than one. Supplements spec.md with the original's
    /// `Warnings.ToError()` convenience, used by callers (e.g. `oracle-query`)
    /// that want a single `Result` rather than a side list.
    #[must_use]
    pub fn into_combined_error(self) -> Option<OracleError> {
        let mut errs = self.0;
        match errs.len() {
            0 => None,
            1 => errs.pop(),
            _ => Some(OracleError::Multiple(errs)),
        }
    }
}

/// The outcome of one feed pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Feed {
    /// Non-fatal issues gathered while feeding (unknown origins, fetch
    /// failures that preserved a still-valid prior price, skipped-by-cancel
    /// origins).
    pub warnings: Warnings,
    /// How many leaves were judged stale and included in the fetch batch.
    pub fed: usize,
}

/// Batches and refreshes a DAG's origin leaves.
pub struct Feeder {
    set: Set,
    clock: Arc<dyn Clock>,
    tag: &'static str,
}

impl Feeder {
    /// Build a `Feeder` over `set`, reading time from `clock`. `tag`
    /// identifies this feeder in its tracing spans, mirroring `Evaluator::new`.
    #[must_use]
    pub fn new(set: Set, clock: Arc<dyn Clock>, tag: &'static str) -> Self {
        Self { set, clock, tag }
    }

    /// Refresh every leaf reachable from `roots` that is stale enough to
    /// need it (`now - leaf.time >= leaf.min_ttl()`), batching fetches by
    /// origin with each origin's pair list deduplicated. A leaf whose fetch
    /// errors keeps its previous price if that price has not itself
    /// expired past `max_ttl`; only an already-expired leaf is overwritten
    /// with the new error, since there is nothing worth preserving.
    #[tracing::instrument(
        name = "oracle_core::feed::feed",
        skip(self, roots, cancel),
        fields(tag = %self.tag, origins = tracing::field::Empty, pairs = tracing::field::Empty, fed = tracing::field::Empty, warnings = tracing::field::Empty)
    )]
    pub async fn feed(&self, roots: &[Node], cancel: &CancelToken) -> Feed {
        let now = self.clock.now();
        let leaves = walk::leaves(roots);

        let stale: Vec<_> = leaves
            .into_iter()
            .filter(|leaf| is_stale(leaf.raw_price().pair_price.time, leaf.min_ttl(), now))
            .collect();

        if stale.is_empty() {
            tracing::Span::current().record("pairs", 0);
            return Feed::default();
        }

        let mut pairs_by_origin: HashMap<&'static str, Vec<Pair>> = HashMap::new();
        let mut seen_pairs: HashMap<&'static str, HashSet<Pair>> = HashMap::new();
        for leaf in &stale {
            let op = leaf.origin_pair();
            let set = seen_pairs.entry(op.origin).or_default();
            if set.insert(op.pair) {
                pairs_by_origin.entry(op.origin).or_default().push(op.pair);
            }
        }
        tracing::Span::current().record("origins", pairs_by_origin.len());
        tracing::Span::current().record("pairs", stale.len());

        let results = self.set.fetch(&pairs_by_origin, cancel).await;

        let mut warnings = Warnings::new();
        for leaf in &stale {
            let op = leaf.origin_pair();
            let Some(by_pair) = results.get(op.origin) else {
                tracing::warn!(origin = op.origin, pair = %op.pair, "no result returned for origin");
                warnings.push(OracleError::origin_fetch(op.origin, op.pair, "no result returned for origin"));
                continue;
            };
            let Some(result) = by_pair.iter().find(|r| r.price.pair == op.pair) else {
                tracing::warn!(origin = op.origin, pair = %op.pair, "origin did not return this pair");
                warnings.push(OracleError::origin_fetch(op.origin, op.pair, "origin did not return this pair"));
                continue;
            };

            match &result.error {
                None => {
                    match leaf.ingest(OriginPrice { pair_price: result.price, origin: op.origin, error: None }) {
                        Ok(()) => tracing::debug!(origin = op.origin, pair = %op.pair, price = result.price.price, "ingested leaf price"),
                        Err(err) => {
                            tracing::warn!(origin = op.origin, pair = %op.pair, error = %err, "leaf ingest rejected");
                            warnings.push(err);
                        }
                    }
                }
                Some(err) => {
                    if leaf.expired(now) {
                        let _ = leaf.ingest(OriginPrice { pair_price: result.price, origin: op.origin, error: Some(err.clone()) });
                    }
                    tracing::warn!(origin = op.origin, pair = %op.pair, error = %err, "leaf fetch failed, skipped");
                    warnings.push(err.clone());
                }
            }
        }

        tracing::Span::current().record("fed", stale.len());
        tracing::Span::current().record("warnings", warnings.len());
        Feed { warnings, fed: stale.len() }
    }
}

fn is_stale(last: DateTime<Utc>, min_ttl: std::time::Duration, now: DateTime<Utc>) -> bool {
    match (now - last).to_std() {
        Ok(age) => age >= min_ttl,
        Err(_) => false,
    }
}
