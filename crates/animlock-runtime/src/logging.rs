//! Diagnostic output setup

use animlock_core::{AnimLockError, AnimLockResult, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a subscriber
/// is already installed or the filter does not parse.
pub fn init_logging(config: &LoggingConfig) -> AnimLockResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| AnimLockError::Config(format!("invalid log filter: {e}")))?,
    };

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_target(false))
            .try_init()
    };

    result.map_err(|e| AnimLockError::Config(format!("logging already initialized: {e}")))
}
