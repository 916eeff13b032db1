//! The signing boundary (spec.md §6): no production signing backend is
//! built here, only the trait a real one would implement and a deterministic
//! test double.

use oracle_core::PairPrice;

/// A signed price ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedPrice {
    /// The sample that was signed.
    pub pair_price: PairPrice,
    /// An opaque, backend-defined signature over `pair_price`.
    pub signature: String,
}

/// Signs evaluated prices before they are published. Implementors must not
/// panic; a signing failure should be surfaced as an `Err`.
pub trait Signer: Send + Sync {
    /// Sign `pair_price`, producing a publishable envelope.
    ///
    /// # Errors
    /// Returns an error if the sample could not be signed.
    fn sign(&self, pair_price: PairPrice) -> anyhow::Result<SignedPrice>;
}

/// A deterministic `Signer` for tests: the "signature" is a fixed tag, not
/// cryptography.
#[derive(Debug, Clone)]
pub struct DeterministicSigner {
    tag: &'static str,
}

impl DeterministicSigner {
    /// Build a signer that tags every signature with `tag`.
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl Signer for DeterministicSigner {
    fn sign(&self, pair_price: PairPrice) -> anyhow::Result<SignedPrice> {
        Ok(SignedPrice {
            pair_price,
            signature: format!("{}:{}:{}", self.tag, pair_price.pair, pair_price.time.timestamp()),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use oracle_core::Pair;

    use super::*;

    #[test]
    fn deterministic_signer_tags_the_pair_and_time() {
        let signer = DeterministicSigner::new("test");
        let pair = Pair::new("BTC", "USD").unwrap();
        let now = Utc::now();
        let signed = signer
            .sign(PairPrice { pair, price: 1.0, bid: 1.0, ask: 1.0, volume_24h: 0.0, time: now })
            .unwrap();
        assert!(signed.signature.starts_with("test:BTC/USD:"));
    }
}
