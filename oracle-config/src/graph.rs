//! Resolves a parsed [`Document`] into a shared DAG of [`Node`]s.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use oracle_core::{Node, OriginPair, Pair, Set};

use crate::error::ConfigError;
use crate::schema::{Document, NodeBlock};

/// A loaded, not-yet-resolved configuration document.
pub struct GraphConfig {
    document: Document,
}

impl GraphConfig {
    /// Parse an HCL document's text into a `GraphConfig`.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if `text` is not valid HCL, or does not
    /// match the expected document shape.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let document = hcl::from_str(text)?;
        Ok(Self { document })
    }

    /// Borrow the parsed document, e.g. to discover which origin names a
    /// config references before building a handler `Set` for it.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Build the DAG, validating every origin leaf's origin against
    /// `origins` and every reference against the declared node set, and
    /// rejecting cyclic references. Construction happens once; newly built
    /// leaves start life already expired (spec.md §3 Lifecycle), since they
    /// have never been fed.
    ///
    /// # Errors
    /// Returns a `ConfigError` describing the first problem found: an
    /// unregistered origin, a dangling reference, a duplicate node name, a
    /// missing required field, an unrecognized `kind`, or a cycle.
    pub fn build(&self, origins: &Set) -> Result<HashMap<Pair, Node>, ConfigError> {
        self.build_at(origins, Utc::now())
    }

    /// As [`build`](Self::build), but with an explicit construction
    /// instant — used by tests that need deterministic leaf "never fed"
    /// timestamps.
    ///
    /// # Errors
    /// See [`build`](Self::build).
    pub fn build_at(&self, origins: &Set, now: DateTime<Utc>) -> Result<HashMap<Pair, Node>, ConfigError> {
        let mut by_name: HashMap<&str, &NodeBlock> = HashMap::with_capacity(self.document.nodes.len());
        for block in &self.document.nodes {
            if by_name.insert(block.name.as_str(), block).is_some() {
                return Err(ConfigError::DuplicateNode(block.name.clone()));
            }
        }

        let mut built: HashMap<String, Node> = HashMap::new();
        let mut building: HashSet<String> = HashSet::new();

        for root in &self.document.roots {
            if !by_name.contains_key(root.as_str()) {
                return Err(ConfigError::UnknownRoot(root.clone()));
            }
            construct(root, &by_name, origins, &mut built, &mut building, now)?;
        }

        let mut out = HashMap::with_capacity(self.document.roots.len());
        for root in &self.document.roots {
            let node = built.get(root).expect("root was just constructed above").clone();
            out.insert(node.pair(), node);
        }
        Ok(out)
    }
}

fn construct(
    name: &str,
    by_name: &HashMap<&str, &NodeBlock>,
    origins: &Set,
    built: &mut HashMap<String, Node>,
    building: &mut HashSet<String>,
    now: DateTime<Utc>,
) -> Result<Node, ConfigError> {
    if let Some(node) = built.get(name) {
        return Ok(node.clone());
    }
    if !building.insert(name.to_string()) {
        return Err(ConfigError::Cyclic(name.to_string()));
    }

    let block = by_name.get(name).ok_or_else(|| ConfigError::UnknownReference { from: name.to_string(), to: name.to_string() })?;
    let pair = parse_pair(block)?;

    let node = match block.kind.as_str() {
        "origin" => {
            let origin_name = block.origin.clone().ok_or_else(|| missing(name, "origin", "origin"))?;
            if !origins.contains(&origin_name) {
                return Err(ConfigError::UnknownOrigin { node: name.to_string(), origin: origin_name });
            }
            let min_ttl = block.min_ttl_secs.ok_or_else(|| missing(name, "origin", "min_ttl_secs"))?;
            let max_ttl = block.max_ttl_secs.ok_or_else(|| missing(name, "origin", "max_ttl_secs"))?;
            let leaked: &'static str = Box::leak(origin_name.into_boxed_str());
            Node::origin(OriginPair { origin: leaked, pair }, Duration::from_secs(min_ttl), Duration::from_secs(max_ttl), now)
        }
        "indirect" => {
            let children_names = block.children.clone().ok_or_else(|| missing(name, "indirect", "children"))?;
            let node = Node::indirect(pair);
            for child_name in &children_names {
                if !by_name.contains_key(child_name.as_str()) {
                    return Err(ConfigError::UnknownReference { from: name.to_string(), to: child_name.clone() });
                }
                let child = construct(child_name, by_name, origins, built, building, now)?;
                node.add_child(child)?;
            }
            node
        }
        "median" => {
            let children_names = block.children.clone().ok_or_else(|| missing(name, "median", "children"))?;
            let min_sources = block.min_sources.ok_or_else(|| missing(name, "median", "min_sources"))?;
            let node = Node::median(pair, min_sources);
            for child_name in &children_names {
                if !by_name.contains_key(child_name.as_str()) {
                    return Err(ConfigError::UnknownReference { from: name.to_string(), to: child_name.clone() });
                }
                let child = construct(child_name, by_name, origins, built, building, now)?;
                node.add_child(child)?;
            }
            node
        }
        other => return Err(ConfigError::UnknownKind { node: name.to_string(), kind: other.to_string() }),
    };

    building.remove(name);
    built.insert(name.to_string(), node.clone());
    Ok(node)
}

fn parse_pair(block: &NodeBlock) -> Result<Pair, ConfigError> {
    let (base, quote) = block.pair.split_once('/').ok_or_else(|| ConfigError::InvalidPair { node: block.name.clone(), pair: block.pair.clone() })?;
    Pair::new(base, quote).ok_or_else(|| ConfigError::InvalidPair { node: block.name.clone(), pair: block.pair.clone() })
}

fn missing(node: &str, kind: &'static str, field: &'static str) -> ConfigError {
    ConfigError::MissingField { node: node.to_string(), kind, field }
}
