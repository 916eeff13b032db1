mod cli;
mod feed_loop;
mod logging;
mod origins;
mod signer;
mod supervisor;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::{Cli, Command, ConfigCommand};
use feed_loop::FeedLoop;
use oracle_core::{Feeder, SystemClock};
use signer::DeterministicSigner;
use supervisor::{Service, Supervisor};
use transport::LoggingTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log.log_filter, cli.log.log_format)?;

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Config { command: ConfigCommand::Validate(args) } => validate(args),
    }
}

async fn run(args: cli::RunArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.config)?;
    let cfg = oracle_config::GraphConfig::parse(&text)?;
    let set = origins::mock_set_for(cfg.document());
    let roots = cfg.build(&set)?;

    let feeder = Feeder::new(set, Arc::new(SystemClock), "oracle-feeder::feed-loop");
    let feed_loop: Box<dyn Service> = Box::new(FeedLoop::new(
        roots.clone(),
        feeder,
        Arc::new(DeterministicSigner::new("oracle-feeder")),
        Arc::new(LoggingTransport::new()),
        Duration::from_secs(args.interval_secs),
    ));

    let query_state = oracle_query::AppState::new(roots);
    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    tracing::info!(listen = %args.listen, "query server listening");
    let query_service: Box<dyn Service> = Box::new(QueryServer { listener, router: oracle_query::router(query_state) });

    let supervisor = Supervisor::new();
    supervisor.run(vec![("feed-loop", feed_loop), ("query-server", query_service)]).await
}

fn validate(args: cli::ValidateArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.config)?;
    let cfg = oracle_config::GraphConfig::parse(&text)?;
    let set = origins::mock_set_for(cfg.document());
    cfg.build(&set)?;
    tracing::info!(config = %args.config.display(), "configuration is valid");
    Ok(())
}

struct QueryServer {
    listener: tokio::net::TcpListener,
    router: axum::Router,
}

#[async_trait::async_trait]
impl Service for QueryServer {
    async fn run(self: Box<Self>, cancel: oracle_core::CancelToken) -> anyhow::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await?;
        Ok(())
    }
}
