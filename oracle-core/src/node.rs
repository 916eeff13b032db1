//! The typed DAG of aggregation nodes (spec.md §3, §4.B).
//!
//! `Node` is a tagged enum over `Arc`-shared inner state, not a trait
//! object hierarchy (Design Note, spec.md §9): this lets the same
//! `OriginLeaf` be referenced by multiple parents cheaply (an `Arc` clone)
//! while keeping aggregation-specific fields (`min_sources`, chain pair)
//! on their own concrete inner types.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::OracleError;
use crate::types::{OriginPair, OriginPrice, Pair};

/// A leaf vertex holding the most recent sample from one `(origin, pair)`.
pub struct OriginLeaf {
    origin_pair: OriginPair,
    min_ttl: Duration,
    max_ttl: Duration,
    price: RwLock<OriginPrice>,
}

impl OriginLeaf {
    /// Build a leaf declaring `origin_pair`, with `min_ttl <= max_ttl`.
    ///
    /// # Panics
    /// Panics if `min_ttl > max_ttl` (an invariant violation at
    /// construction time, not a runtime condition callers should need to
    /// recover from).
    #[must_use]
    pub fn new(origin_pair: OriginPair, min_ttl: Duration, max_ttl: Duration, at_construction: chrono::DateTime<chrono::Utc>) -> Arc<Self> {
        assert!(min_ttl <= max_ttl, "min_ttl must not exceed max_ttl");
        Arc::new(Self {
            origin_pair,
            min_ttl,
            max_ttl,
            price: RwLock::new(OriginPrice::errored(
                origin_pair.origin,
                origin_pair.pair,
                OracleError::PriceTTLExpired(origin_pair),
                // A freshly built leaf has never been fed; backdate it far
                // enough that it is immediately both stale and expired.
                at_construction - chrono::Duration::from_std(max_ttl).unwrap_or(chrono::Duration::zero()) - chrono::Duration::seconds(1),
            )),
        })
    }

    /// The leaf's declared `(origin, pair)`.
    #[must_use]
    pub const fn origin_pair(&self) -> OriginPair {
        self.origin_pair
    }

    /// The minimum age a sample must reach before the Feeder considers it
    /// stale.
    #[must_use]
    pub const fn min_ttl(&self) -> Duration {
        self.min_ttl
    }

    /// The maximum age at which a sample is still usable.
    #[must_use]
    pub const fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    /// The raw stored sample, with no TTL logic applied.
    #[must_use]
    pub fn raw_price(&self) -> OriginPrice {
        self.price.read().expect("origin leaf lock poisoned").clone()
    }

    /// Returns true if the raw stored sample is older than `max_ttl` as of
    /// `now`.
    #[must_use]
    pub fn expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        let raw = self.raw_price();
        match (now - raw.pair_price.time).to_std() {
            Ok(age) => age > self.max_ttl,
            Err(_) => false, // raw.time is in the future relative to `now`
        }
    }

    /// The sample as of `now`: the raw stored value, or a
    /// `PriceTTLExpired`-tagged value if it has outlived `max_ttl`.
    #[must_use]
    pub fn price(&self, now: chrono::DateTime<chrono::Utc>) -> OriginPrice {
        let mut raw = self.raw_price();
        if raw.error.is_none() && self.expired(now) {
            raw.error = Some(OracleError::PriceTTLExpired(self.origin_pair));
        }
        raw
    }

    /// Set the leaf's price. Rejects samples whose origin or pair don't
    /// match this leaf's declared `OriginPair`.
    ///
    /// # Errors
    /// Returns `IncompatibleOrigin` or `IncompatiblePair` if `incoming`
    /// does not match this leaf's declared `(origin, pair)`.
    pub fn ingest(&self, incoming: OriginPrice) -> Result<(), OracleError> {
        if incoming.origin != self.origin_pair.origin {
            return Err(OracleError::IncompatibleOrigin {
                expected: self.origin_pair,
                got: incoming.origin.to_string(),
            });
        }
        if incoming.pair_price.pair != self.origin_pair.pair {
            return Err(OracleError::IncompatiblePair {
                expected: self.origin_pair,
                got: incoming.pair_price.pair,
            });
        }
        *self.price.write().expect("origin leaf lock poisoned") = incoming;
        Ok(())
    }
}

/// Composes a chain of children's prices into a declared pair by walking
/// quote→base matches (spec.md §3, §4.E).
pub struct IndirectInner {
    pair: Pair,
    children: RwLock<Vec<Node>>,
}

/// Collects children whose (possibly inverted) pair equals the declared
/// pair and returns their median, subject to a quorum floor.
pub struct MedianInner {
    pair: Pair,
    min_sources: usize,
    children: RwLock<Vec<Node>>,
}

/// A DAG vertex. Cheaply cloneable (an `Arc` clone); the same `Origin` leaf
/// may be shared by multiple parents.
#[derive(Clone)]
pub enum Node {
    /// A leaf backed by one `(origin, pair)`.
    Origin(Arc<OriginLeaf>),
    /// An indirect chain-composition node.
    Indirect(Arc<IndirectInner>),
    /// A weighted-median-with-quorum node.
    Median(Arc<MedianInner>),
}

impl Node {
    /// Build a leaf node.
    #[must_use]
    pub fn origin(origin_pair: OriginPair, min_ttl: Duration, max_ttl: Duration, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self::Origin(OriginLeaf::new(origin_pair, min_ttl, max_ttl, now))
    }

    /// Build an indirect aggregator node with no children yet.
    #[must_use]
    pub fn indirect(pair: Pair) -> Self {
        Self::Indirect(Arc::new(IndirectInner {
            pair,
            children: RwLock::new(Vec::new()),
        }))
    }

    /// Build a median aggregator node with no children yet.
    #[must_use]
    pub fn median(pair: Pair, min_sources: usize) -> Self {
        Self::Median(Arc::new(MedianInner {
            pair,
            min_sources,
            children: RwLock::new(Vec::new()),
        }))
    }

    /// The node's declared output pair.
    #[must_use]
    pub fn pair(&self) -> Pair {
        match self {
            Self::Origin(leaf) => leaf.origin_pair().pair,
            Self::Indirect(inner) => inner.pair,
            Self::Median(inner) => inner.pair,
        }
    }

    /// The node's children, in insertion order. Empty for leaves.
    #[must_use]
    pub fn children(&self) -> Vec<Node> {
        match self {
            Self::Origin(_) => Vec::new(),
            Self::Indirect(inner) => inner.children.read().expect("indirect lock poisoned").clone(),
            Self::Median(inner) => inner.children.read().expect("median lock poisoned").clone(),
        }
    }

    /// Append `child` to this node's child list. Duplicates are permitted
    /// (the Feeder collapses them when planning a batch); appending to a
    /// leaf is a no-op, since leaves have no children.
    ///
    /// # Errors
    /// Returns `CyclicGraph` if `child` already (transitively) contains
    /// `self`, or if `child` and `self` are the same node.
    pub fn add_child(&self, child: Node) -> Result<(), OracleError> {
        if self.ptr_id() == child.ptr_id() || reaches(&child, self) {
            return Err(OracleError::CyclicGraph);
        }
        match self {
            Self::Origin(_) => {}
            Self::Indirect(inner) => inner.children.write().expect("indirect lock poisoned").push(child),
            Self::Median(inner) => inner.children.write().expect("median lock poisoned").push(child),
        }
        Ok(())
    }

    /// Pointer identity of this node's inner allocation, used by the
    /// Walker and cycle detection. Two clones of the same `Node` share an
    /// id; two independently-constructed nodes never do.
    #[must_use]
    pub fn ptr_id(&self) -> usize {
        match self {
            Self::Origin(leaf) => Arc::as_ptr(leaf) as usize,
            Self::Indirect(inner) => Arc::as_ptr(inner) as usize,
            Self::Median(inner) => Arc::as_ptr(inner) as usize,
        }
    }

    /// The declared quorum floor, for median nodes only.
    #[must_use]
    pub fn min_sources(&self) -> Option<usize> {
        match self {
            Self::Median(inner) => Some(inner.min_sources),
            _ => None,
        }
    }

    /// Downcast to the leaf's `OriginLeaf`, for Feedable handling.
    #[must_use]
    pub fn as_origin_leaf(&self) -> Option<&Arc<OriginLeaf>> {
        match self {
            Self::Origin(leaf) => Some(leaf),
            _ => None,
        }
    }
}

/// Depth-first search: does `start`'s subtree contain `target`?
fn reaches(start: &Node, target: &Node) -> bool {
    if start.ptr_id() == target.ptr_id() {
        return true;
    }
    start.children().iter().any(|c| reaches(c, target))
}
