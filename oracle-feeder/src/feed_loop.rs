//! Ties the engine's `Feeder`/`Evaluator` together with signing and
//! publishing into one timer-driven [`Service`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use oracle_core::{CancelToken, Evaluator, Feeder, Node, Pair};

use crate::signer::Signer;
use crate::supervisor::Service;
use crate::transport::Transport;

/// Periodically refreshes every leaf reachable from `roots`, evaluates each
/// root, and signs and publishes the result.
pub struct FeedLoop {
    roots: HashMap<Pair, Node>,
    feeder: Feeder,
    evaluator: Evaluator,
    signer: Arc<dyn Signer>,
    transport: Arc<dyn Transport>,
    interval: Duration,
}

impl FeedLoop {
    /// Build a `FeedLoop` over `roots`, waking every `interval`.
    #[must_use]
    pub fn new(roots: HashMap<Pair, Node>, feeder: Feeder, signer: Arc<dyn Signer>, transport: Arc<dyn Transport>, interval: Duration) -> Self {
        let evaluator = Evaluator::new("oracle-feeder::feed-loop");
        Self { roots, feeder, evaluator, signer, transport, interval }
    }

    async fn tick_once(&self, cancel: &CancelToken) {
        let nodes: Vec<Node> = self.roots.values().cloned().collect();
        let feed = self.feeder.feed(&nodes, cancel).await;
        if !feed.warnings.is_empty() {
            tracing::warn!(fed = feed.fed, warnings = feed.warnings.len(), "feed pass produced warnings");
        }

        let now = chrono::Utc::now();
        for (pair, node) in &self.roots {
            match self.evaluator.evaluate(node, now) {
                Ok(tick) => match self.signer.sign(tick.pair_price) {
                    Ok(signed) => {
                        if let Err(err) = self.transport.publish(&signed).await {
                            tracing::error!(%pair, %err, "publish failed");
                        }
                    }
                    Err(err) => tracing::error!(%pair, %err, "signing failed"),
                },
                Err(err) => tracing::warn!(%pair, %err, "evaluation failed, skipping this pair this tick"),
            }
        }
    }
}

#[async_trait]
impl Service for FeedLoop {
    async fn run(self: Box<Self>, cancel: CancelToken) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => return Ok(()),
                _ = ticker.tick() => self.tick_once(&cancel).await,
            }
        }
    }
}
