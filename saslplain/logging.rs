use tracing_subscriber::EnvFilter;

use crate::Config;

/// Default filter directive for a verbosity level, used when `RUST_LOG` is not set.
fn default_directive(verbosity: isize) -> &'static str {
    match verbosity {
        v if v < 0 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.verbosity)));
    // stdout carries the daemon's reply lines
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let format = config.log_format.to_lowercase();
    match format.as_str() {
        "compact" => builder.compact().init(),
        "pretty" => builder.pretty().init(),
        "full" => builder.init(),
        _ => builder.init(),
    }

    tracing::info!(format = format.as_str(), "Logging initialized")
}
