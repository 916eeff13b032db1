//! The pure, transport-independent query function.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use oracle_core::{evaluate, Node, Pair, PairPrice};
use serde::Serialize;

/// The outcome of querying one pair's root node at an instant.
///
/// `error` and `price` are mutually exclusive; `warnings` carries
/// stringified non-fatal issues (e.g. a median that tolerated one bad
/// child) even when `price` is present.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// The pair that was requested.
    pub pair: Pair,
    /// The evaluated sample, present only when evaluation succeeded.
    pub price: Option<PairPrice>,
    /// Non-fatal issues encountered while evaluating, rendered as text.
    pub warnings: Vec<String>,
    /// The evaluation failure, rendered as text, if the pair has no usable
    /// price right now.
    pub error: Option<String>,
}

/// Evaluate `pair`'s root node in `roots` at `now` and shape the outcome for
/// a caller that doesn't care how the DAG was built.
///
/// Returns a `QueryResult` with `error` set to a not-found message if `pair`
/// has no registered root, rather than panicking or returning `Option`: a
/// query surface always has something to say about any pair a client asks
/// for.
#[must_use]
pub fn query(roots: &HashMap<Pair, Node>, pair: Pair, now: DateTime<Utc>) -> QueryResult {
    let Some(root) = roots.get(&pair) else {
        return QueryResult {
            pair,
            price: None,
            warnings: Vec::new(),
            error: Some(format!("no configured root for pair {pair}")),
        };
    };

    match evaluate(root, now) {
        Ok(tick) => QueryResult {
            pair,
            price: Some(tick.pair_price),
            warnings: tick.warnings.flatten().iter().map(ToString::to_string).collect(),
            error: None,
        },
        Err(err) => QueryResult {
            pair,
            price: None,
            warnings: Vec::new(),
            error: Some(err.to_string()),
        },
    }
}
