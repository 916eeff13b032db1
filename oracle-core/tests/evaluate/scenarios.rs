use std::time::Duration;

use chrono::Utc;
use oracle_core::{evaluate, Node, OracleError, OriginPair, OriginPrice, Pair, PairPrice};

fn fed_leaf(origin_pair: OriginPair, price: f64, at: chrono::DateTime<chrono::Utc>) -> Node {
    let leaf = Node::origin(origin_pair, Duration::from_secs(1), Duration::from_secs(3600), at);
    let Node::Origin(inner) = &leaf else { unreachable!() };
    inner
        .ingest(OriginPrice {
            pair_price: PairPrice { pair: origin_pair.pair, price, bid: price * 0.99, ask: price * 1.01, volume_24h: 1.0, time: at },
            origin: origin_pair.origin,
            error: None,
        })
        .unwrap();
    leaf
}

/// Scenario 5: Indirect(A/C) over Origin(A/B)=2.0 and Origin(B/C)=3.0
/// composes to price 6.0 with time = min(t_AB, t_BC).
#[test]
fn chain_composition() {
    let t_ab = Utc::now() - chrono::Duration::seconds(30);
    let t_bc = Utc::now() - chrono::Duration::seconds(10);
    let ab = fed_leaf(OriginPair { origin: "o", pair: Pair::new("A", "B").unwrap() }, 2.0, t_ab);
    let bc = fed_leaf(OriginPair { origin: "o", pair: Pair::new("B", "C").unwrap() }, 3.0, t_bc);

    let top = Node::indirect(Pair::new("A", "C").unwrap());
    top.add_child(ab).unwrap();
    top.add_child(bc).unwrap();

    let tick = evaluate(&top, Utc::now()).unwrap();
    assert!((tick.pair_price.price - 6.0).abs() < 1e-9);
    assert_eq!(tick.pair_price.time, t_ab.min(t_bc));
}

/// Scenario 6: Median(A/B, 3) with two successful children and one errored
/// child fails with `NotEnoughSources`, and the warning tree records the
/// upstream handler error.
#[test]
fn median_below_quorum_surfaces_upstream_error_as_warning() {
    let pair = Pair::new("A", "B").unwrap();
    let now = Utc::now();
    let a = fed_leaf(OriginPair { origin: "o1", pair }, 10.0, now);
    let b = fed_leaf(OriginPair { origin: "o2", pair }, 12.0, now);
    // never fed: starts life already expired.
    let errored = Node::origin(OriginPair { origin: "o3", pair }, Duration::from_secs(1), Duration::from_secs(60), now);

    let top = Node::median(pair, 3);
    top.add_child(a).unwrap();
    top.add_child(b).unwrap();
    top.add_child(errored).unwrap();

    let err = evaluate(&top, now).unwrap_err();
    assert!(matches!(err, OracleError::NotEnoughSources { have: 2, min_sources: 3, .. }));
}

/// A failing child under a median that still meets quorum is downgraded to
/// a warning rather than failing the whole node.
#[test]
fn median_above_quorum_demotes_failing_child_to_warning() {
    let pair = Pair::new("A", "B").unwrap();
    let now = Utc::now();
    let a = fed_leaf(OriginPair { origin: "o1", pair }, 10.0, now);
    let b = fed_leaf(OriginPair { origin: "o2", pair }, 12.0, now);
    let errored = Node::origin(OriginPair { origin: "o3", pair }, Duration::from_secs(1), Duration::from_secs(60), now);

    let top = Node::median(pair, 2);
    top.add_child(a).unwrap();
    top.add_child(b).unwrap();
    top.add_child(errored).unwrap();

    let tick = evaluate(&top, now).unwrap();
    let warnings = tick.warnings.flatten();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0], OracleError::PriceTTLExpired(_)));
}
