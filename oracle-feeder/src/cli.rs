//! Command line surface, mirroring the original's `cmd/ghost/cmd.go` command
//! tree: a `run` service and a `config validate` dry-run, sharing one set of
//! logging flags via `#[clap(flatten)]`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "oracle-feeder", about = "Oracle price-feeder: feed, sign, and publish a declarative price graph")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the graph, start the feed loop and the local query server.
    Run(RunArgs),
    /// Load and validate the graph without starting any service.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse and build the graph, exiting non-zero on the first error found.
    Validate(ValidateArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Path to the HCL graph configuration.
    #[arg(long, env)]
    pub config: PathBuf,
    /// Address the local query server binds to.
    #[arg(long, env, default_value = "127.0.0.1:8080")]
    pub listen: String,
    /// How often the feed loop wakes up to refresh stale leaves.
    #[arg(long, env, default_value = "10")]
    pub interval_secs: u64,
}

#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Path to the HCL graph configuration.
    #[arg(long, env)]
    pub config: PathBuf,
}

#[derive(Debug, Parser)]
pub struct LogArgs {
    /// A `tracing` `EnvFilter` directive, e.g. `oracle_feeder=debug,info`.
    #[arg(long, env, default_value = "info")]
    pub log_filter: String,
    /// Output encoding for log lines.
    #[arg(long, env, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
