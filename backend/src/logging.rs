use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// With the `console` feature the tokio-console layer is added next to the
/// fmt layer; the level filter only applies to fmt output.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_filter(filter));

    #[cfg(feature = "console")]
    let registry = registry.with(console_subscriber::spawn());

    if registry.try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
