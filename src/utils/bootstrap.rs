//! Bootstrap utilities for kverify binaries and test runners.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LOG_ENV_VAR, LOG_FORMAT_ENV_VAR};

/// Initialize tracing with the KVERIFY_LOG environment variable.
///
/// Defaults to "info" level if KVERIFY_LOG is not set. Output is JSON when
/// KVERIFY_LOG_FORMAT=json, human-readable otherwise. A second call leaves
/// the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json_format() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

fn json_format() -> bool {
    std::env::var(LOG_FORMAT_ENV_VAR)
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
