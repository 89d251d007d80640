use tracing_subscriber::EnvFilter;
use weather_core::Config;

const DEFAULT_LEVEL: &str = "warn";

/// Log to stderr so rendered weather on stdout stays clean.
///
/// `RUST_LOG` wins, then `trace_level` from the config file, then `warn`.
pub fn init_tracing(config: &Config, verbose: bool) {
    let fallback = if verbose {
        "debug".to_string()
    } else {
        config.trace_level.clone().unwrap_or_else(|| DEFAULT_LEVEL.to_string())
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
