//! Tracing subscriber bootstrap.

use anyhow::Context;
use courselib_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Build the filter from `RUST_LOG` when present, else from the configured directives.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
        return Ok(EnvFilter::from_default_env());
    }

    let filter = EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("invalid log filter '{}'", settings.filter))?
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower_http=info".parse()?);

    Ok(filter)
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;

    match settings.log_format {
        LogFormat::Pretty => {
            let subscriber = Registry::default()
                .with(fmt::layer().with_target(true).pretty())
                .with(filter);
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to install tracing subscriber")?;
        }
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(fmt::layer().json().with_current_span(true))
                .with(filter);
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to install tracing subscriber")?;
        }
    }

    tracing::debug!(target: "courselib-telemetry", format = ?settings.log_format, "telemetry initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let settings = TelemetrySettings {
            log_format: LogFormat::Pretty,
            filter: "courselib=notalevel".to_string(),
        };
        assert!(env_filter(&settings).is_err());
    }

    #[test]
    fn accepts_default_filter() {
        assert!(env_filter(&TelemetrySettings::default()).is_ok());
    }
}
