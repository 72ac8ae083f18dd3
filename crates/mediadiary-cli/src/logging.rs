//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV};

/// Install the stderr subscriber.
///
/// The filter comes from `MEDIADIARY_LOG`, then `configured`, then `warn`.
pub fn init(configured: Option<&str>) {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => configured
            .and_then(|directive| EnvFilter::try_new(directive).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
