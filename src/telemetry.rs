use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// Respects `RUST_LOG` when set, otherwise logs at `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
