//! The publish boundary (spec.md §6): no real libp2p/gossip transport is
//! built here, only the trait and a logging test double.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::signer::SignedPrice;

/// Publishes signed prices to the peer-to-peer transport. Implementors must
/// not panic; a publish failure should be surfaced as an `Err` so the feed
/// loop can record it as a warning rather than lose the tick silently.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publish one signed price.
    ///
    /// # Errors
    /// Returns an error if the message could not be published.
    async fn publish(&self, signed: &SignedPrice) -> anyhow::Result<()>;
}

/// A `Transport` that logs every publish instead of sending it anywhere,
/// and records them for assertions in tests.
#[derive(Debug, Default)]
pub struct LoggingTransport {
    published: Mutex<Vec<SignedPrice>>,
}

impl LoggingTransport {
    /// Build an empty `LoggingTransport`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot everything published so far, in publish order.
    pub async fn published(&self) -> Vec<SignedPrice> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl Transport for LoggingTransport {
    async fn publish(&self, signed: &SignedPrice) -> anyhow::Result<()> {
        tracing::info!(pair = %signed.pair_price.pair, price = signed.pair_price.price, "publishing signed price");
        self.published.lock().await.push(signed.clone());
        Ok(())
    }
}
