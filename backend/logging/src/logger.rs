//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control and either
//! human-readable or JSON console output.

use draftschema_config::LogFormat;
use draftschema_config::defaults::DEFAULT_LOG_LEVEL;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level` when it parses. Calling this twice is a no-op.
pub fn init_logger(level: &str, format: LogFormat) {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_filter(from_env.as_deref(), level);

    let registry = tracing_subscriber::registry().with(env_filter);

    let _ = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stdout)
                    .with_target(false)
                    .with_ansi(true),
            )
            .try_init(),
    };
}

/// First directive set that parses: the env value, then `level`, then the
/// default level.
fn build_filter(from_env: Option<&str>, level: &str) -> EnvFilter {
    from_env
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}
