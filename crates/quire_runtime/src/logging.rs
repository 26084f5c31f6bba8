//! Log setup for the `quire` binary.

use quire_foundation::{Error, ErrorKind, Result};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Installs a stderr subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `debug` if `debug` is
/// true and `warn` if not, so a normal build prints only its summary.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_span_events(fmt::format::FmtSpan::NONE),
        )
        .with(filter)
        .try_init()
        .map_err(|e| Error::new(ErrorKind::Internal(format!("tracing init failed: {e}"))))
}
