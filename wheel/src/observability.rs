//! Logging setup
//!
//! The generator reports each step through `tracing` events. Output goes to
//! stderr so it never mixes with the command summary printed on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// `RUST_LOG` always wins. Otherwise only warnings are shown, or debug output
/// for this crate when `verbose` is set.
///
/// # Example
///
/// ```rust,no_run
/// wheel::observability::init(false).unwrap();
/// tracing::info!("generator started");
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbose: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,wheel=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .try_init()
}
