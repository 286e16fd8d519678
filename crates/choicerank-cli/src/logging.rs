use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// An explicit `level` wins over `RUST_LOG`; with neither, `info` is used.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level: {level}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to install the log subscriber")
}
