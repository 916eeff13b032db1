//! The Evaluator (spec.md §4.E): recursive bottom-up evaluation of a node
//! into a [`Tick`], with a warnings tree collecting every non-fatal issue
//! encountered along the way.

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::error::OracleError;
use crate::node::Node;
use crate::types::{Pair, PairPrice};

/// One node's contribution to a [`Tick`]'s warnings tree: the node's own
/// pair, an error if this node itself is the source of a warning, and the
/// same structure recursively for every child that was walked. Preserves
/// the shape of the walked sub-DAG so a consumer can tell which branch (and
/// ultimately which origin) a final error or warning came from.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningNode {
    /// The pair this node was declared against.
    pub pair: Pair,
    /// Set when this node itself failed or was excluded (e.g. a median
    /// child that errored, or didn't compose with the node's pair).
    pub error: Option<OracleError>,
    /// The same structure for each child that was walked.
    pub children: Vec<WarningNode>,
}

impl WarningNode {
    fn ok(pair: Pair) -> Self {
        Self { pair, error: None, children: Vec::new() }
    }

    /// True if neither this node nor anything beneath it carries a warning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.children.iter().all(WarningNode::is_empty)
    }

    /// Every error in this subtree, deepest descendant first, for callers
    /// that only need the flat list (e.g. rendering warnings as text).
    #[must_use]
    pub fn flatten(&self) -> Vec<OracleError> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<OracleError>) {
        for child in &self.children {
            child.flatten_into(out);
        }
        if let Some(err) = &self.error {
            out.push(err.clone());
        }
    }
}

/// The outcome of evaluating one node: its computed price plus every
/// non-fatal warning gathered from descendants that were excluded but did
/// not sink the result (e.g. a median child that errored while quorum was
/// still met by the others).
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// The node's computed sample.
    pub pair_price: PairPrice,
    /// The subtree of non-fatal issues encountered evaluating this node.
    pub warnings: WarningNode,
}

/// Recursive bottom-up evaluator (spec.md §4.E). A thin wrapper over the
/// free [`evaluate`] fn that attaches a logger tag, mirroring `Feeder::new`:
/// one `tracing` span per call, tagged with the pair and the resulting
/// warning count.
pub struct Evaluator {
    tag: &'static str,
}

impl Evaluator {
    /// Build an `Evaluator` that tags its spans with `tag`.
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }

    /// Evaluate `node` as of `now`. See the free [`evaluate`] fn for the
    /// per-node-kind semantics.
    ///
    /// # Errors
    /// Returns the node's own evaluation error; never panics.
    #[tracing::instrument(name = "oracle_core::evaluator::evaluate", skip(self, node), fields(tag = %self.tag, pair = %node.pair(), warnings = tracing::field::Empty))]
    pub fn evaluate(&self, node: &Node, now: DateTime<Utc>) -> Result<Tick, OracleError> {
        let result = evaluate(node, now);
        if let Ok(tick) = &result {
            tracing::Span::current().record("warnings", tick.warnings.flatten().len());
        }
        result
    }
}

/// Evaluate `node` as of `now`.
///
/// - An `Origin` leaf fails iff its current price carries an error
///   (absent sample, incompatible ingest, or expired TTL).
/// - An `Indirect` node fails iff any child fails: a chain is only as
///   strong as its weakest link, so a failing child aborts evaluation with
///   that child's own error rather than being merely a warning.
/// - A `Median` node tolerates failing children as warnings, as long as
///   enough children still produced a valid sample to meet `min_sources`;
///   below quorum it fails with `NotEnoughSources`. Each surviving child is
///   first normalized to the median's declared pair (inverted if it's
///   quoted as the reciprocal); a child whose pair composes with neither is
///   dropped as a warning rather than corrupting the median with
///   reciprocal-scale numbers.
///
/// # Errors
/// Returns the node's own evaluation error (see above); never panics.
pub fn evaluate(node: &Node, now: DateTime<Utc>) -> Result<Tick, OracleError> {
    match node {
        Node::Origin(leaf) => {
            let price = leaf.price(now);
            match price.error {
                Some(err) => {
                    tracing::warn!(pair = %node.pair(), error = %err, "origin leaf unavailable");
                    Err(err)
                }
                None => {
                    tracing::debug!(pair = %node.pair(), price = price.pair_price.price, "origin leaf evaluated");
                    Ok(Tick { pair_price: price.pair_price, warnings: WarningNode::ok(node.pair()) })
                }
            }
        }
        Node::Indirect(_) => evaluate_indirect(node, now),
        Node::Median(_) => evaluate_median(node, now),
    }
}

fn evaluate_indirect(node: &Node, now: DateTime<Utc>) -> Result<Tick, OracleError> {
    let children = node.children();
    let mut links = Vec::with_capacity(children.len());
    let mut child_warnings = Vec::with_capacity(children.len());
    for child in &children {
        let tick = evaluate(child, now)?;
        child_warnings.push(tick.warnings);
        links.push(tick.pair_price);
    }
    let pair_price = aggregate::chain(node.pair(), &links)?;
    Ok(Tick { pair_price, warnings: WarningNode { pair: node.pair(), error: None, children: child_warnings } })
}

fn evaluate_median(node: &Node, now: DateTime<Utc>) -> Result<Tick, OracleError> {
    let children = node.children();
    let target = node.pair();
    let min_sources = node.min_sources().unwrap_or(1);
    let mut samples = Vec::with_capacity(children.len());
    let mut child_warnings = Vec::with_capacity(children.len());
    for child in &children {
        match evaluate(child, now) {
            Ok(tick) => match aggregate::normalize_to(target, tick.pair_price) {
                Some(normalized) => {
                    child_warnings.push(tick.warnings);
                    samples.push(normalized);
                }
                None => {
                    let err = OracleError::IncomposableMedianChild { target, got: tick.pair_price.pair };
                    tracing::warn!(%target, child_pair = %tick.pair_price.pair, "median child dropped, pair does not compose");
                    child_warnings.push(WarningNode { pair: child.pair(), error: Some(err), children: vec![tick.warnings] });
                }
            },
            Err(err) => child_warnings.push(WarningNode { pair: child.pair(), error: Some(err), children: Vec::new() }),
        }
    }
    let pair_price = aggregate::median(target, min_sources, &samples)?;
    Ok(Tick { pair_price, warnings: WarningNode { pair: target, error: None, children: child_warnings } })
}
