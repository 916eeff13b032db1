use oracle_core::OracleError;
use thiserror::Error;

/// Failures building a graph from a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be parsed as HCL.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] hcl::Error),

    /// A `pair` string was not a valid `BASE/QUOTE` identifier.
    #[error("node {node:?} declares an invalid pair {pair:?}")]
    InvalidPair {
        /// The offending node's name.
        node: String,
        /// The raw pair string that failed to parse.
        pair: String,
    },

    /// Two `node` blocks declared the same name.
    #[error("duplicate node name {0:?}")]
    DuplicateNode(String),

    /// A node referenced a child or origin leaf name that isn't declared.
    #[error("node {from:?} references unknown node {to:?}")]
    UnknownReference {
        /// The referencing node.
        from: String,
        /// The missing reference.
        to: String,
    },

    /// An origin leaf declared an origin not present in the `Set` supplied
    /// to [`crate::GraphConfig::build`].
    #[error("node {node:?} declares unregistered origin {origin:?}")]
    UnknownOrigin {
        /// The offending node's name.
        node: String,
        /// The unregistered origin name.
        origin: String,
    },

    /// A required field was missing for the node's declared `kind`.
    #[error("node {node:?} ({kind}) is missing required field {field}")]
    MissingField {
        /// The offending node's name.
        node: String,
        /// The node's declared kind.
        kind: &'static str,
        /// The missing field's name.
        field: &'static str,
    },

    /// A `kind` string didn't match `origin`, `indirect`, or `median`.
    #[error("node {node:?} has unknown kind {kind:?}")]
    UnknownKind {
        /// The offending node's name.
        node: String,
        /// The unrecognized kind string.
        kind: String,
    },

    /// Graph construction detected a cycle among node references.
    #[error("cyclic reference starting at {0:?}")]
    Cyclic(String),

    /// A `roots` entry named a node that isn't declared.
    #[error("root {0:?} is not a declared node")]
    UnknownRoot(String),

    /// The underlying graph engine rejected the construction.
    #[error(transparent)]
    Graph(#[from] OracleError),
}
