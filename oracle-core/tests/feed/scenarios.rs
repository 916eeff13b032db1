use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use oracle_core::{CancelToken, Feeder, FetchResult, ManualClock, Node, OriginHandler, OriginPair, Pair, PairPrice, Set};

struct CountingHandler {
    calls: Arc<AtomicUsize>,
    price: f64,
}

#[async_trait]
impl OriginHandler for CountingHandler {
    async fn fetch(&self, pairs: &[Pair]) -> Vec<FetchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        pairs
            .iter()
            .map(|&pair| FetchResult {
                price: PairPrice { pair, price: self.price, bid: self.price, ask: self.price, volume_24h: 10.0, time: Utc::now() },
                error: None,
            })
            .collect()
    }
}

/// Scenario 1: single origin, single pair, fresh feed.
#[tokio::test]
async fn single_origin_single_pair() {
    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = Set::new();
    set.register("test", Arc::new(CountingHandler { calls: calls.clone(), price: 10.0 }));
    let pair = Pair::new("A", "B").unwrap();
    let leaf = Node::origin(OriginPair { origin: "test", pair }, Duration::from_secs(0), Duration::from_secs(60), now);

    let feeder = Feeder::new(set, clock.clone(), "test");
    let feed = feeder.feed(&[leaf.clone()], &CancelToken::new()).await;

    assert!(feed.warnings.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let Node::Origin(inner) = &leaf else { unreachable!() };
    assert!((inner.raw_price().pair_price.price - 10.0).abs() < 1e-9);
}

/// Scenario 2: the same leaf added under two parents must be fetched once,
/// and both parents must see the same post-ingest value.
#[tokio::test]
async fn shared_leaf_is_deduplicated() {
    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = Set::new();
    set.register("test2", Arc::new(CountingHandler { calls: calls.clone(), price: 99.0 }));
    let pair = Pair::new("E", "F").unwrap();
    let leaf = Node::origin(OriginPair { origin: "test2", pair }, Duration::from_secs(0), Duration::from_secs(60), now);

    let parent_a = Node::median(pair, 1);
    let parent_b = Node::median(pair, 1);
    parent_a.add_child(leaf.clone()).unwrap();
    parent_b.add_child(leaf.clone()).unwrap();

    let feeder = Feeder::new(set, clock.clone(), "test");
    let feed = feeder.feed(&[parent_a.clone(), parent_b.clone()], &CancelToken::new()).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(feed.fed, 1);
    assert_eq!(parent_a.children()[0].ptr_id(), parent_b.children()[0].ptr_id());
}

/// Scenario 3: a leaf fresher than its `min_ttl` triggers no handler call.
#[tokio::test]
async fn below_min_ttl_makes_no_call() {
    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = Set::new();
    set.register("test", Arc::new(CountingHandler { calls: calls.clone(), price: 1.0 }));
    let pair = Pair::new("A", "B").unwrap();
    let ingested_at = now - chrono::Duration::seconds(5);
    let leaf = Node::origin(OriginPair { origin: "test", pair }, Duration::from_secs(10), Duration::from_secs(60), ingested_at);
    let Node::Origin(inner) = &leaf else { unreachable!() };
    inner
        .ingest(oracle_core::OriginPrice {
            pair_price: PairPrice { pair, price: 5.0, bid: 5.0, ask: 5.0, volume_24h: 1.0, time: ingested_at },
            origin: "test",
            error: None,
        })
        .unwrap();

    let feeder = Feeder::new(set, clock, "test");
    let feed = feeder.feed(&[leaf], &CancelToken::new()).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(feed.fed, 0);
}

/// Scenario 4: a leaf between `min_ttl` and `max_ttl` is refreshed.
#[tokio::test]
async fn between_min_and_max_ttl_is_refreshed() {
    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = Set::new();
    set.register("test", Arc::new(CountingHandler { calls: calls.clone(), price: 77.0 }));
    let pair = Pair::new("A", "B").unwrap();
    let ingested_at = now - chrono::Duration::seconds(30);
    let leaf = Node::origin(OriginPair { origin: "test", pair }, Duration::from_secs(10), Duration::from_secs(60), ingested_at);
    let Node::Origin(inner) = &leaf else { unreachable!() };
    inner
        .ingest(oracle_core::OriginPrice {
            pair_price: PairPrice { pair, price: 5.0, bid: 5.0, ask: 5.0, volume_24h: 1.0, time: ingested_at },
            origin: "test",
            error: None,
        })
        .unwrap();

    let feeder = Feeder::new(set, clock, "test");
    let feed = feeder.feed(&[leaf.clone()], &CancelToken::new()).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let Node::Origin(inner) = &leaf else { unreachable!() };
    assert!((inner.raw_price().pair_price.price - 77.0).abs() < 1e-9);
}

/// Against a real (fixture-backed) handler rather than a local test double:
/// a forced failure on one leaf must not disturb a healthy sibling fed in
/// the same batch.
#[tokio::test]
async fn mock_handler_failure_is_isolated_to_its_own_leaf() {
    let now = Utc::now();
    let clock = Arc::new(ManualClock::new(now));
    let mut set = Set::new();
    set.register("mock", Arc::new(oracle_mock::MockHandler::new("mock")));

    let healthy_pair = Pair::new("BTC", "USD").unwrap();
    let healthy = Node::origin(OriginPair { origin: "mock", pair: healthy_pair }, Duration::from_secs(0), Duration::from_secs(60), now);
    let failing_pair = Pair::new("FAIL", "USD").unwrap();
    let failing = Node::origin(OriginPair { origin: "mock", pair: failing_pair }, Duration::from_secs(0), Duration::from_secs(60), now);

    let feeder = Feeder::new(set, clock, "test");
    let feed = feeder.feed(&[healthy.clone(), failing.clone()], &CancelToken::new()).await;

    assert_eq!(feed.fed, 2);
    assert_eq!(feed.warnings.len(), 1);
    let Node::Origin(inner) = &healthy else { unreachable!() };
    assert!((inner.raw_price().pair_price.price - 20_000.0).abs() < 1e-9);
}
