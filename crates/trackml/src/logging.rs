//! Structured logging setup.
//!
//! The client crates only emit `tracing` events. Applications that have no
//! subscriber of their own can call [`init_logging`] once at start-up.
//! `RUST_LOG` takes precedence over the configured level when set.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Crates whose events the default filter enables.
const CLIENT_TARGETS: [&str; 3] = ["trackml", "tracking", "http_transport"];

/// How log output is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for the client crates.
    pub level: Level,

    /// Emit one JSON object per event instead of console text.
    pub use_json: bool,

    /// Include the module target (e.g. `tracking::client`) in each line.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Default configuration at `level`.
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output at `INFO`, for log collectors.
    pub fn json() -> Self {
        Self {
            use_json: true,
            ..Default::default()
        }
    }

    /// Filter directives applied when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        let mut directives = vec!["warn".to_string()];
        directives.extend(CLIENT_TARGETS.iter().map(|target| format!("{target}={level}")));
        directives.join(",")
    }
}

/// Parses a level name, case-insensitively. Unknown names yield `INFO`.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Installs a global subscriber. Only the first call has any effect, and it
/// leaves an already-installed subscriber in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.use_json {
            registry
                .with(fmt::layer().json().with_target(config.include_target))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(config.include_target))
                .try_init()
        };

        if result.is_err() {
            tracing::debug!("A global subscriber is already installed; keeping it");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("Warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("info"), Level::INFO);
    }

    #[test]
    fn test_parse_level_invalid_defaults_to_info() {
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
    }

    #[test]
    fn test_json_config() {
        let config = LoggingConfig::json();
        assert!(config.use_json);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_default_directives_cover_client_crates() {
        let directives = LoggingConfig::with_level(Level::DEBUG).default_directives();
        assert_eq!(
            directives,
            "warn,trackml=debug,tracking=debug,http_transport=debug"
        );
    }
}
