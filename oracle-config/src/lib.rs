//! Declarative HCL configuration for a price-graph DAG.
//!
//! Every node — origin leaf or aggregator — is a named top-level `node`
//! block; aggregators reference children by name, so two roots can share
//! one leaf. See [`GraphConfig`] for the entry point.

mod error;
mod graph;
mod schema;

pub use error::ConfigError;
pub use graph::GraphConfig;
pub use schema::{Document, NodeBlock};

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_core::Set;

    const DOC: &str = r#"
        roots = ["BTC/USD"]

        node "binance-btc-usd" {
          pair        = "BTC/USD"
          kind        = "origin"
          origin      = "binance"
          min_ttl_secs = 10
          max_ttl_secs = 60
        }

        node "coinbase-btc-usd" {
          pair        = "BTC/USD"
          kind        = "origin"
          origin      = "coinbase"
          min_ttl_secs = 10
          max_ttl_secs = 60
        }

        node "BTC/USD" {
          pair        = "BTC/USD"
          kind        = "median"
          min_sources = 2
          children    = ["binance-btc-usd", "coinbase-btc-usd"]
        }
    "#;

    fn origins_with(names: &[&'static str]) -> Set {
        struct NoopHandler;
        #[async_trait::async_trait]
        impl oracle_core::OriginHandler for NoopHandler {
            async fn fetch(&self, _pairs: &[oracle_core::Pair]) -> Vec<oracle_core::FetchResult> {
                Vec::new()
            }
        }
        let mut set = Set::new();
        for &name in names {
            set.register(name, std::sync::Arc::new(NoopHandler));
        }
        set
    }

    #[test]
    fn builds_a_median_over_two_shared_origins() {
        let cfg = GraphConfig::parse(DOC).unwrap();
        let origins = origins_with(&["binance", "coinbase"]);
        let roots = cfg.build(&origins).unwrap();
        let pair = oracle_core::Pair::new("BTC", "USD").unwrap();
        let root = roots.get(&pair).unwrap();
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn rejects_unregistered_origin() {
        let cfg = GraphConfig::parse(DOC).unwrap();
        let origins = origins_with(&["binance"]);
        assert!(matches!(cfg.build(&origins), Err(ConfigError::UnknownOrigin { .. })));
    }

    #[test]
    fn rejects_unknown_reference() {
        let doc = r#"
            roots = ["top"]
            node "top" {
              pair = "BTC/USD"
              kind = "indirect"
              children = ["missing"]
            }
        "#;
        let cfg = GraphConfig::parse(doc).unwrap();
        let origins = origins_with(&[]);
        assert!(matches!(cfg.build(&origins), Err(ConfigError::UnknownReference { .. })));
    }

    #[test]
    fn rejects_cyclic_reference() {
        let doc = r#"
            roots = ["a"]
            node "a" { pair = "A/B" kind = "indirect" children = ["b"] }
            node "b" { pair = "A/B" kind = "indirect" children = ["a"] }
        "#;
        let cfg = GraphConfig::parse(doc).unwrap();
        let origins = origins_with(&[]);
        assert!(matches!(cfg.build(&origins), Err(ConfigError::Cyclic(_))));
    }
}
