use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, e.g. `HOTSPOTS_LOG=debug`.
pub const LOG_ENV: &str = "HOTSPOTS_LOG";

/// Install the global subscriber. Logs go to stderr; stdout carries command
/// output only. `verbose` raises the default level from `warn` to `debug`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when embedded in another tool.
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
