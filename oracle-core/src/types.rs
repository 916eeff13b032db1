//! Core data model: pairs, samples, and the results a handler returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// An ordered (base, quote) currency/asset identifier, e.g. `BTC/USD`.
///
/// Equality is componentwise; `invert` swaps base and quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// The base symbol, e.g. `"BTC"`.
    pub base: Symbol,
    /// The quote symbol, e.g. `"USD"`.
    pub quote: Symbol,
}

/// A short uppercase asset symbol. Stored inline (no heap allocation) since
/// venue symbols are short and the type is used pervasively as a map key.
pub type Symbol = [u8; 16];

impl Pair {
    /// Build a pair from two symbol strings, left-padding/truncating is not
    /// performed: symbols longer than 16 bytes are rejected.
    ///
    /// # Errors
    /// Returns `None` if either symbol exceeds 16 ASCII-uppercase bytes.
    #[must_use]
    pub fn new(base: &str, quote: &str) -> Option<Self> {
        Some(Self {
            base: symbol_of(base)?,
            quote: symbol_of(quote)?,
        })
    }

    /// Return the pair with base and quote swapped.
    #[must_use]
    pub const fn invert(self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Render the base symbol as a `&str`.
    #[must_use]
    pub fn base_str(&self) -> &str {
        str_of(&self.base)
    }

    /// Render the quote symbol as a `&str`.
    #[must_use]
    pub fn quote_str(&self) -> &str {
        str_of(&self.quote)
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base_str(), self.quote_str())
    }
}

impl std::fmt::Debug for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pair({self})")
    }
}

fn symbol_of(s: &str) -> Option<Symbol> {
    if s.is_empty() || s.len() > 16 || !s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
        return None;
    }
    let mut buf = [0u8; 16];
    buf[..s.len()].copy_from_slice(s.as_bytes());
    Some(buf)
}

fn str_of(sym: &Symbol) -> &str {
    let len = sym.iter().position(|&b| b == 0).unwrap_or(sym.len());
    std::str::from_utf8(&sym[..len]).unwrap_or("")
}

/// A leaf's declared `(origin, pair)` — the key a handler batch is planned
/// and fetched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginPair {
    /// Opaque tag naming a handler in the `Set`.
    pub origin: &'static str,
    /// The pair this leaf wants from that origin.
    pub pair: Pair,
}

impl std::fmt::Display for OriginPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.origin, self.pair)
    }
}

/// One market-data sample. All numeric fields are atomic together: a
/// `PairPrice` with only some fields populated is not meaningful without
/// `pair` and `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairPrice {
    /// The pair this sample is for.
    pub pair: Pair,
    /// The observed price.
    pub price: f64,
    /// The observed bid.
    pub bid: f64,
    /// The observed ask.
    pub ask: f64,
    /// 24h trading volume in base units.
    pub volume_24h: f64,
    /// The wall-clock instant this sample was observed at.
    pub time: DateTime<Utc>,
}

/// A sample tagged with the origin it came from and the terminal status of
/// the most recent ingest attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginPrice {
    /// The underlying sample. May be stale or zeroed when `error` is set.
    pub pair_price: PairPrice,
    /// The origin this sample came from.
    pub origin: &'static str,
    /// The terminal status of the most recent ingest attempt, if any.
    pub error: Option<OracleError>,
}

impl OriginPrice {
    /// Build an error-only `OriginPrice` (no valid sample), used when a
    /// handler fails and there is no prior price to preserve.
    #[must_use]
    pub fn errored(origin: &'static str, pair: Pair, error: OracleError, time: DateTime<Utc>) -> Self {
        Self {
            pair_price: PairPrice {
                pair,
                price: 0.0,
                bid: 0.0,
                ask: 0.0,
                volume_24h: 0.0,
                time,
            },
            origin,
            error: Some(error),
        }
    }
}

/// The result of a single `(origin, pair)` fetch, as returned by a
/// [`crate::origin::OriginHandler`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// The sample, valid only if `error` is `None`.
    pub price: PairPrice,
    /// Set when the handler could not produce a valid sample.
    pub error: Option<OracleError>,
}
