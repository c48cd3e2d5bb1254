//! Structured logging setup for the draftsman binary.
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber once, through [`init`]. Output goes to stderr so it never
//! interleaves with the progress bars on stdout. `RUST_LOG` takes precedence
//! over the configured level.
//!
//! # Example
//!
//! ```no_run
//! use draftsman::logging::{self, LoggingConfig};
//!
//! logging::init(&LoggingConfig::default());
//! tracing::info!(phase = "requirements", "Automating phase");
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// `[logging]` section of draftsman.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }
}

/// Parses a log level, case-insensitively.
pub fn parse_level(level_str: &str) -> Option<Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let level = parse_level(&config.level).unwrap_or(Level::INFO);
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,draftsman={}", level.as_str().to_lowercase()))
    })
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config);

        let result = match config.format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .try_init(),
        };

        if let Err(e) = result {
            eprintln!("Failed to initialize logging: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("Debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.with_level("debug").level, "debug");
    }

    #[test]
    fn test_format_from_toml() {
        let config: LoggingConfig = toml::from_str(r#"format = "json""#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(&LoggingConfig::default());
        init(&LoggingConfig::default().with_level("debug"));
    }
}
