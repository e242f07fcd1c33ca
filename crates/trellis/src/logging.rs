//! Subscriber setup for the `trellis` binary

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "TRELLIS_LOG";

/// Install a stderr subscriber
///
/// `TRELLIS_LOG` wins when set; otherwise `--verbose` selects `debug` and the
/// default is `warn`, so suppressed evaluation failures still show up.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}
