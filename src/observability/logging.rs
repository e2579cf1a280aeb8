//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter directive used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable multi-line output.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parses a format name; anything other than `json` is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive.
    pub filter: String,
    /// Optional log file; stderr when absent.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_LOG_FILTER.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds logging configuration from config settings.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>) -> Self {
        let Some(settings) = settings else {
            return Self::default();
        };
        Self {
            format: settings
                .format
                .as_deref()
                .map(LogFormat::parse)
                .unwrap_or_default(),
            filter: settings
                .filter
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            file: settings.file.as_ref().map(PathBuf::from),
        }
    }

    /// Builds the `EnvFilter` for the configured directive.
    ///
    /// # Errors
    ///
    /// Returns an error if the directive does not parse.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.filter).map_err(|e| Error::OperationFailed {
            operation: "parse_log_filter".to_string(),
            cause: format!("{}: {e}", self.filter),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json", LogFormat::Json; "json")]
    #[test_case(" JSON ", LogFormat::Json; "json padded uppercase")]
    #[test_case("pretty", LogFormat::Pretty; "pretty")]
    #[test_case("xml", LogFormat::Pretty; "unknown falls back")]
    fn test_log_format_parse(input: &str, expected: LogFormat) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[test]
    fn test_from_settings_defaults() {
        assert_eq!(LoggingConfig::from_settings(None), LoggingConfig::default());

        let config = LoggingConfig::from_settings(Some(&LoggingSettings::default()));
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.filter, DEFAULT_LOG_FILTER);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_from_settings_values() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            filter: Some("localstore=debug".to_string()),
            file: Some("/tmp/ls.log".to_string()),
        };
        let config = LoggingConfig::from_settings(Some(&settings));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "localstore=debug");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/ls.log")));
    }

    #[test]
    fn test_env_filter_valid_and_invalid() {
        assert!(LoggingConfig::default().env_filter().is_ok());

        let bad = LoggingConfig {
            filter: "localstore=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            bad.env_filter(),
            Err(Error::OperationFailed { ref operation, .. }) if operation == "parse_log_filter"
        ));
    }
}
