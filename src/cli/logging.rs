//! Logging initialization

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `debug` when the debug flag is
/// set, else the configured level. Output goes to stderr so command output on
/// stdout stays machine readable.
pub fn init_logging(debug: bool, level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if debug { "debug" } else { level }))?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    if debug {
        tracing::debug!("Debug logging enabled");
    }
    Ok(())
}
