use thiserror::Error;

use crate::types::{OriginPair, Pair};

/// Unified error type for the price-graph engine.
///
/// Mirrors the taxonomy of the engine: capability mismatches at the leaf
/// level, staleness at query time, quorum/chain failures in aggregation,
/// transport failures from origins, and cycle rejection at graph
/// construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OracleError {
    /// `ingest` was called on a leaf with an origin that doesn't match the
    /// leaf's declared `OriginPair`.
    #[error("incompatible origin: leaf wants {expected:?}, got {got}")]
    IncompatibleOrigin {
        /// The leaf's declared origin/pair.
        expected: OriginPair,
        /// The origin name the caller actually supplied.
        got: String,
    },

    /// `ingest` was called on a leaf with a pair that doesn't match the
    /// leaf's declared `OriginPair`.
    #[error("incompatible pair: leaf wants {expected:?}, got {got:?}")]
    IncompatiblePair {
        /// The leaf's declared origin/pair.
        expected: OriginPair,
        /// The pair the caller actually supplied.
        got: Pair,
    },

    /// The leaf's sample is older than `maxTTL` at query time.
    #[error("price for {0:?} has expired its max TTL")]
    PriceTTLExpired(OriginPair),

    /// Fewer than `min_sources` non-errored children remained for a median.
    #[error("not enough sources for {pair:?}: need {min_sources}, had {have}")]
    NotEnoughSources {
        /// The median node's declared pair.
        pair: Pair,
        /// The configured quorum floor.
        min_sources: usize,
        /// The number of surviving (non-errored) children.
        have: usize,
    },

    /// An indirect node's children do not compose into its declared pair.
    #[error("invalid indirect chain for {0:?}: children do not compose to the declared pair")]
    InvalidIndirectChain(Pair),

    /// A median child's pair is neither the node's declared pair nor its
    /// inverse, so it can't be normalized into the same scale as the rest.
    #[error("median child pair {got:?} does not compose with declared pair {target:?}")]
    IncomposableMedianChild {
        /// The median node's declared pair.
        target: Pair,
        /// The child's own pair.
        got: Pair,
    },

    /// A handler reported a transport or decode failure for `(origin, pair)`.
    #[error("origin fetch failed for {origin} {pair:?}: {message}")]
    OriginFetchError {
        /// The origin that failed.
        origin: String,
        /// The pair that was requested.
        pair: Pair,
        /// A human-readable description of the failure.
        message: String,
    },

    /// A cycle was detected while constructing the graph.
    #[error("cyclic graph detected while adding a child")]
    CyclicGraph,

    /// An origin name was referenced that the `Set` has no handler for.
    #[error("unknown origin: {0}")]
    UnknownOrigin(String),

    /// Several independent errors occurred and were combined (e.g. from
    /// `Warnings::into_combined_error`); supplements spec.md with the
    /// original's `Warnings.ToError()` convenience.
    #[error("{} errors occurred: {}", .0.len(), render_multi(.0))]
    Multiple(Vec<OracleError>),
}

fn render_multi(errs: &[OracleError]) -> String {
    errs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OracleError {
    /// Build an `OriginFetchError` from a connector name, pair, and message.
    pub fn origin_fetch(origin: impl Into<String>, pair: Pair, message: impl Into<String>) -> Self {
        Self::OriginFetchError {
            origin: origin.into(),
            pair,
            message: message.into(),
        }
    }
}
