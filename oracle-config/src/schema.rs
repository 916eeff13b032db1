//! The HCL document shape. Every node in the graph — origin leaf or
//! aggregator — is a top-level, named `node` block; aggregators reference
//! their children by name, which is what lets two roots share one leaf.

use serde::Deserialize;

/// A parsed configuration document, not yet resolved into a graph.
#[derive(Debug, Deserialize)]
pub struct Document {
    /// The node names to build and return from [`crate::GraphConfig::build`].
    pub roots: Vec<String>,
    /// All declared nodes, keyed by their label in the document.
    #[serde(rename = "node")]
    pub nodes: Vec<NodeBlock>,
}

/// One `node "name" { ... }` block.
#[derive(Debug, Deserialize)]
pub struct NodeBlock {
    /// The block's label; how other nodes and `roots` refer to it.
    pub name: String,
    /// The output pair, as `"BASE/QUOTE"`.
    pub pair: String,
    /// `"origin"`, `"indirect"`, or `"median"`.
    pub kind: String,
    /// Required for `kind = "origin"`: the origin name to register under.
    pub origin: Option<String>,
    /// Required for `kind = "origin"`: minimum sample age before refeeding.
    pub min_ttl_secs: Option<u64>,
    /// Required for `kind = "origin"`: maximum sample age before expiry.
    pub max_ttl_secs: Option<u64>,
    /// Required for `kind = "median"`: the quorum floor.
    pub min_sources: Option<usize>,
    /// Required for `kind = "indirect"` or `"median"`: child node names, in
    /// declaration order.
    pub children: Option<Vec<String>>,
}
