//! Logging setup

use tracing_subscriber::EnvFilter;

use crate::config::Environment;

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins when set; otherwise development logs this crate at debug.
pub fn init_tracing(environment: Environment) {
    let fallback = if environment.is_development() {
        "info,notetree_server=debug,tower_http=debug"
    } else {
        "info"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .try_init();
}
