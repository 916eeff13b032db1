//! Minimal service lifecycle: every long-running part of the binary (the
//! feed loop, the query server) is a [`Service`]; [`Supervisor`] starts them
//! all, stops every other one as soon as any single one exits or the
//! process is asked to shut down, and reports the first failure.
//!
//! Mirrors the original's `pkg/config/gofernext/gofer.go` `Services::Start`/
//! `Wait` pair (start every configured service, wait for the first failure)
//! and the teacher's `StreamHandle` stop-then-abort discipline.

use async_trait::async_trait;
use oracle_core::CancelToken;
use tokio::task::JoinSet;

/// A long-running part of the binary, cooperatively cancelled via a shared
/// [`CancelToken`]. Implementors should return promptly once `cancel`
/// resolves.
#[async_trait]
pub trait Service: Send + 'static {
    /// Run until `cancel` fires or the service completes on its own.
    ///
    /// # Errors
    /// Returns an error if the service cannot continue running.
    async fn run(self: Box<Self>, cancel: CancelToken) -> anyhow::Result<()>;
}

/// Starts and supervises a fixed set of [`Service`]s.
#[derive(Default)]
pub struct Supervisor {
    cancel: CancelToken,
}

impl Supervisor {
    /// Build a `Supervisor` with a fresh cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self { cancel: CancelToken::new() }
    }

    /// The token every spawned service observes; also handed to whatever
    /// else in `main` needs to know when shutdown has begun (e.g. the feed
    /// loop's own inner fetch cancellation).
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run `services` to completion: spawn each on its own `tokio::task`,
    /// wait for the first to exit or for SIGINT/SIGTERM, then cancel and
    /// drain the rest.
    ///
    /// # Errors
    /// Returns the first error encountered, from either a service or a
    /// panicked task join.
    pub async fn run(self, services: Vec<(&'static str, Box<dyn Service>)>) -> anyhow::Result<()> {
        let mut set = JoinSet::new();
        for (name, service) in services {
            let cancel = self.cancel.clone();
            set.spawn(async move { (name, service.run(cancel).await) });
        }

        let mut first_error = None;
        tokio::select! {
            signal_result = shutdown_signal() => {
                if let Err(err) = signal_result {
                    tracing::warn!(%err, "failed to install shutdown signal handler");
                } else {
                    tracing::info!("received shutdown signal");
                }
            }
            Some(joined) = set.join_next() => {
                record(&mut first_error, joined);
            }
        }

        self.cancel.cancel();

        while let Some(joined) = set.join_next().await {
            record(&mut first_error, joined);
        }

        first_error.map_or(Ok(()), Err)
    }
}

fn record(first_error: &mut Option<anyhow::Error>, joined: Result<(&'static str, anyhow::Result<()>), tokio::task::JoinError>) {
    match joined {
        Ok((name, Ok(()))) => tracing::info!(name, "service exited"),
        Ok((name, Err(err))) => {
            tracing::error!(name, %err, "service failed");
            first_error.get_or_insert(err);
        }
        Err(join_err) => {
            tracing::error!(%join_err, "service task panicked");
            first_error.get_or_insert(join_err.into());
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map_err(Into::into),
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await.map_err(Into::into)
}
