//! Logger construction, owned entirely by `main` and threaded down — the
//! engine itself never constructs a subscriber.

use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Install a global `tracing` subscriber built from `filter`/`format`.
///
/// # Errors
/// Returns an error if a subscriber has already been installed.
pub fn init(filter: &str, format: LogFormat) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match format {
        LogFormat::Text => builder.try_init().map_err(|e| anyhow::anyhow!(e)),
        LogFormat::Json => builder.json().try_init().map_err(|e| anyhow::anyhow!(e)),
    }
}
