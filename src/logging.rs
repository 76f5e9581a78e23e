use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a verbosity count (`-v`, `-vv`).
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "plotline=debug,info",
        _ => "trace",
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over the verbosity flag.
///
/// Returns an error when a global subscriber is already set.
pub fn init(verbosity: u8) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {}", e))
}
