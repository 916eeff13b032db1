//! Pure aggregation rules (spec.md §4.F): chain composition for indirect
//! nodes and weighted median with quorum for median nodes.
//!
//! These functions take and return plain [`PairPrice`] values and never
//! touch the graph, so they're exercised directly by property tests.

use crate::error::OracleError;
use crate::types::{Pair, PairPrice};

/// Invert a sample: swap base/quote, reciprocal the price, and swap+reciprocal
/// bid/ask (a quote's old ask becomes the inverted bid, and vice versa).
/// Volume and time pass through unchanged.
#[must_use]
pub fn invert(p: PairPrice) -> PairPrice {
    PairPrice {
        pair: p.pair.invert(),
        price: reciprocal(p.price),
        bid: reciprocal(p.ask),
        ask: reciprocal(p.bid),
        volume_24h: p.volume_24h,
        time: p.time,
    }
}

fn reciprocal(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { 1.0 / x }
}

/// Normalize a sample to `target`'s pair ahead of a median: pass it through
/// unchanged if it's already quoted as `target`, invert it if it's quoted as
/// `target`'s inverse, or reject it if it's neither (a median child whose
/// pair isn't reconcilable with the node's declared pair at all).
#[must_use]
pub fn normalize_to(target: Pair, p: PairPrice) -> Option<PairPrice> {
    if p.pair == target {
        Some(p)
    } else if p.pair.invert() == target {
        Some(invert(p))
    } else {
        None
    }
}

/// Compose a chain of samples into `target`, walking quote→base matches and
/// inverting links where needed. `links` must be given in the order the
/// indirect node's children were declared; the first link's base and the
/// last link's quote, once each is inverted as needed, must equal `target`.
///
/// Volume on a chain is not a meaningful quantity (spec.md §9 Open
/// Question resolution), so the result always carries `volume_24h = 0.0`.
/// The result's `time` is the oldest link's time: a chain is only as fresh
/// as its stalest leg.
///
/// # Errors
/// Returns `InvalidIndirectChain` if the links do not compose end-to-end
/// into `target`, or if `links` is empty.
pub fn chain(target: Pair, links: &[PairPrice]) -> Result<PairPrice, OracleError> {
    let Some((first, rest)) = links.split_first() else {
        return Err(OracleError::InvalidIndirectChain(target));
    };

    let mut acc = if first.pair.base == target.base {
        *first
    } else if first.pair.invert().base == target.base {
        invert(*first)
    } else {
        return Err(OracleError::InvalidIndirectChain(target));
    };

    for link in rest {
        let next = if link.pair.base == acc.pair.quote {
            *link
        } else if link.pair.invert().base == acc.pair.quote {
            invert(*link)
        } else {
            return Err(OracleError::InvalidIndirectChain(target));
        };
        acc = PairPrice {
            pair: Pair { base: acc.pair.base, quote: next.pair.quote },
            price: acc.price * next.price,
            bid: acc.bid * next.bid,
            ask: acc.ask * next.ask,
            volume_24h: 0.0,
            time: acc.time.min(next.time),
        };
    }

    if acc.pair != target {
        return Err(OracleError::InvalidIndirectChain(target));
    }
    Ok(acc)
}

/// Compute the median of `samples`' price/bid/ask, subject to a quorum
/// floor of `min_sources`. Volume is the sum across all contributing
/// samples (spec.md §9 Open Question resolution). The result's `time` is
/// the oldest contributing sample's time.
///
/// # Errors
/// Returns `NotEnoughSources` if `samples.len() < min_sources`.
pub fn median(target: Pair, min_sources: usize, samples: &[PairPrice]) -> Result<PairPrice, OracleError> {
    if samples.len() < min_sources {
        return Err(OracleError::NotEnoughSources {
            pair: target,
            min_sources,
            have: samples.len(),
        });
    }
    let price = median_of(samples.iter().map(|s| s.price));
    let bid = median_of(samples.iter().map(|s| s.bid));
    let ask = median_of(samples.iter().map(|s| s.ask));
    let volume_24h = samples.iter().map(|s| s.volume_24h).sum();
    let time = samples.iter().map(|s| s.time).min().expect("samples is non-empty: min_sources >= 1 implies len >= 1 when quorum met, and len == 0 is rejected above when min_sources >= 1");
    Ok(PairPrice { pair: target, price, bid, ask, volume_24h, time })
}

fn median_of(values: impl Iterator<Item = f64>) -> f64 {
    let mut xs: Vec<f64> = values.collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = xs.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        xs[n / 2]
    } else {
        (xs[n / 2 - 1] + xs[n / 2]) / 2.0
    }
}
