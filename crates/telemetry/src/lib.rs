//! Tracing subscriber bootstrap driven by [`TelemetrySettings`].

use anyhow::anyhow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global subscriber. `RUST_LOG` wins over `log_level`.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    match settings.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init(),
    }
    .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;

    tracing::debug!(
        target: "bookshelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.log_level)
            .map_err(|e| anyhow!("invalid log level '{}': {}", settings.log_level, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_log_level_is_reported() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Pretty,
            log_level: "bookshelf=loud[".to_string(),
        };

        if std::env::var("RUST_LOG").is_err() {
            let err = env_filter(&settings).unwrap_err();
            assert!(err.to_string().contains("invalid log level"));
        }
    }

    #[test]
    fn directive_log_level_is_accepted() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Json,
            log_level: "bookshelf_app=debug,tower_http=info".to_string(),
        };
        assert!(env_filter(&settings).is_ok());
    }
}
