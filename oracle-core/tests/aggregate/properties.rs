use chrono::{TimeZone, Utc};
use oracle_core::{aggregate, Pair, PairPrice};
use proptest::prelude::*;

fn arb_price() -> impl Strategy<Value = f64> {
    1e-6f64..1e9
}

fn arb_pair_price() -> impl Strategy<Value = PairPrice> {
    (arb_price(), arb_price(), arb_price(), 0f64..1e9, 0i64..2_000_000_000).prop_map(|(price, bid, ask, volume_24h, ts)| PairPrice {
        pair: Pair::new("A", "B").unwrap(),
        price,
        bid,
        ask,
        volume_24h,
        time: Utc.timestamp_opt(ts, 0).unwrap(),
    })
}

proptest! {
    /// Inversion round-trip: `invert(invert(pp)) == pp` for all
    /// numerically valid PairPrices (spec.md §8).
    #[test]
    fn inversion_round_trips(pp in arb_pair_price()) {
        let back = aggregate::invert(aggregate::invert(pp));
        prop_assert!((back.price - pp.price).abs() < 1e-6 * pp.price.abs().max(1.0));
        prop_assert!((back.bid - pp.bid).abs() < 1e-6 * pp.bid.abs().max(1.0));
        prop_assert!((back.ask - pp.ask).abs() < 1e-6 * pp.ask.abs().max(1.0));
        prop_assert_eq!(back.pair, pp.pair);
    }

    /// Median parity: for an odd number of samples the result equals the
    /// sorted middle element; for an even number it equals the mean of the
    /// two middle elements (spec.md §8).
    #[test]
    fn median_parity(mut prices in prop::collection::vec(arb_price(), 1..12)) {
        let pair = Pair::new("A", "B").unwrap();
        let samples: Vec<PairPrice> = prices
            .iter()
            .copied()
            .map(|price| PairPrice { pair, price, bid: price, ask: price, volume_24h: 0.0, time: Utc::now() })
            .collect();
        let out = aggregate::median(pair, 1, &samples).unwrap();

        prices.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = prices.len();
        let expected = if n % 2 == 1 { prices[n / 2] } else { (prices[n / 2 - 1] + prices[n / 2]) / 2.0 };
        prop_assert!((out.price - expected).abs() < 1e-6 * expected.abs().max(1.0));
    }
}

/// Chain composition is associative in the sense that grouping a three-link
/// chain left or right yields the same price (not in spec.md's property
/// list, but a natural consequence of §4.F worth pinning down).
#[test]
fn chain_is_order_independent_of_grouping() {
    let a = PairPrice { pair: Pair::new("A", "B").unwrap(), price: 2.0, bid: 2.0, ask: 2.0, volume_24h: 0.0, time: Utc::now() };
    let b = PairPrice { pair: Pair::new("B", "C").unwrap(), price: 3.0, bid: 3.0, ask: 3.0, volume_24h: 0.0, time: Utc::now() };
    let c = PairPrice { pair: Pair::new("C", "D").unwrap(), price: 5.0, bid: 5.0, ask: 5.0, volume_24h: 0.0, time: Utc::now() };

    let whole = aggregate::chain(Pair::new("A", "D").unwrap(), &[a, b, c]).unwrap();

    let ab = aggregate::chain(Pair::new("A", "C").unwrap(), &[a, b]).unwrap();
    let grouped = aggregate::chain(Pair::new("A", "D").unwrap(), &[ab, c]).unwrap();

    assert!((whole.price - grouped.price).abs() < 1e-9);
    assert!((whole.price - 30.0).abs() < 1e-9);
}
