//! Builds the origin handler `Set` a loaded config needs.
//!
//! Real venue adapters are out of scope (spec.md §1): every origin name a
//! config declares is backed by a deterministic [`oracle_mock::MockHandler`],
//! enough to run the feed loop and query server end to end against fixture
//! data.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use oracle_config::Document;
use oracle_core::Set;
use oracle_middleware::HandlerBuilder;
use oracle_mock::MockHandler;

/// Register a `MockHandler` for every distinct origin name referenced by an
/// `origin`-kind node in `document`, wrapped in the standard blacklist/quota
/// layers so a misbehaving fixture origin behaves like a misbehaving real
/// one would.
#[must_use]
pub fn mock_set_for(document: &Document) -> Set {
    let mut set = Set::new();
    let mut seen = HashSet::new();
    for node in &document.nodes {
        let Some(origin) = &node.origin else { continue };
        if seen.insert(origin.clone()) {
            let name: &'static str = Box::leak(origin.clone().into_boxed_str());
            let handler = HandlerBuilder::new(name, Arc::new(MockHandler::new(name)))
                .with_blacklist(Duration::from_secs(60))
                .with_quota(60, Duration::from_secs(60))
                .build();
            set.register(name, handler);
        }
    }
    set
}
