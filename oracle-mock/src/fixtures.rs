use oracle_core::Pair;

/// A deterministic `(price, bid, ask, volume_24h)` tuple for a pair, or
/// `None` if the fixture table has no entry for it.
#[must_use]
pub fn by_pair(pair: Pair) -> Option<(f64, f64, f64, f64)> {
    match (pair.base_str(), pair.quote_str()) {
        ("BTC", "USD") => Some((20_000.0, 19_990.0, 20_010.0, 1_200.0)),
        ("ETH", "USD") => Some((2_000.0, 1_998.0, 2_002.0, 4_500.0)),
        ("BTC", "ETH") => Some((10.0, 9.98, 10.02, 300.0)),
        ("SOL", "USD") => Some((100.0, 99.5, 100.5, 9_000.0)),
        ("EUR", "USD") => Some((1.08, 1.0799, 1.0801, 50_000.0)),
        _ => None,
    }
}
