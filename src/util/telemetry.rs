//! Telemetry helpers for structured logging.

/// Initialize tracing for the admission service. Embedders can install their
/// own subscriber first; this helper only installs an env-filtered default
/// subscriber when none has been set. Reads `.env` for `RUST_LOG` overrides.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
