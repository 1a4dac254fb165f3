//! Tracing subscriber setup shared by the binaries

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("aurora={0},tower_http={0}", config.level)))
        .unwrap_or_else(|_| EnvFilter::new("aurora=info,tower_http=info"))
}

/// Install the global subscriber; call once at startup
pub fn init(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    if config.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Run `f` under a temporary default subscriber
///
/// Covers startup work that logs before the configured subscriber exists,
/// such as loading the config itself.
pub fn with_bootstrap<T>(f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter(&LoggingConfig::default()))
        .with(fmt::layer());
    tracing::subscriber::with_default(subscriber, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_subscriber_is_active() {
        let active = with_bootstrap(|| {
            tracing::dispatcher::get_default(|d| {
                d.downcast_ref::<tracing_subscriber::Registry>().is_some()
            })
        });
        assert!(active);

        let config = with_bootstrap(crate::config::Config::default);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_filter_from_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        };
        let filter = env_filter(&config);
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LoggingConfig {
            level: "not a level!!".to_string(),
            format: "json".to_string(),
        };
        let filter = env_filter(&config);
        assert!(!filter.to_string().is_empty());
    }
}
