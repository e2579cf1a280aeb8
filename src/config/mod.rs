//! Configuration management.
//!
//! Configuration comes from three layers, later ones winning:
//! built-in defaults, an optional TOML file, and `LOCALSTORE_*` environment
//! variables.
//!
//! ```toml
//! [store]
//! location = "/var/lib/app/local.db"
//! busy_timeout_ms = 15000
//! read_only = false
//! journal_mode = "WAL"
//!
//! [logging]
//! format = "json"
//! filter = "localstore=info"
//! file = "/var/log/app/localstore.log"
//!
//! [metrics]
//! enabled = true
//! ```

use crate::storage::sqlite::DEFAULT_BUSY_TIMEOUT;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`StoreConfig::location`].
pub const ENV_PATH: &str = "LOCALSTORE_PATH";
/// Environment variable overriding [`StoreConfig::busy_timeout`], in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "LOCALSTORE_BUSY_TIMEOUT_MS";
/// Environment variable overriding [`StoreConfig::read_only`].
pub const ENV_READ_ONLY: &str = "LOCALSTORE_READ_ONLY";
/// Environment variable overriding [`StoreConfig::journal_mode`].
pub const ENV_JOURNAL_MODE: &str = "LOCALSTORE_JOURNAL_MODE";
/// Environment variable overriding the log format (`json` or `pretty`).
pub const ENV_LOG_FORMAT: &str = "LOCALSTORE_LOG_FORMAT";
/// Environment variable overriding the log filter directive.
pub const ENV_LOG_FILTER: &str = "LOCALSTORE_LOG";
/// Environment variable overriding the log file path.
pub const ENV_LOG_FILE: &str = "LOCALSTORE_LOG_FILE";
/// Environment variable enabling the Prometheus recorder.
pub const ENV_METRICS_ENABLED: &str = "LOCALSTORE_METRICS_ENABLED";

/// Settings for one local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the database file.
    pub location: PathBuf,
    /// How long the engine waits on a locked file before reporting it busy.
    pub busy_timeout: Duration,
    /// Open the file read-only.
    pub read_only: bool,
    /// Optional `PRAGMA journal_mode` applied on open.
    pub journal_mode: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: PathBuf::from("local.db"),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            read_only: false,
            journal_mode: None,
        }
    }
}

impl StoreConfig {
    /// Creates store settings for `location` with default values otherwise.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets read-only mode.
    #[must_use]
    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the journal mode.
    #[must_use]
    pub fn with_journal_mode(mut self, mode: impl Into<String>) -> Self {
        self.journal_mode = Some(mode.into());
        self
    }
}

/// Logging section of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: `json` or `pretty`.
    pub format: Option<String>,
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<String>,
}

/// Metrics section of the configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Install the Prometheus recorder.
    pub enabled: Option<bool>,
}

/// Observability settings (logging and metrics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilitySettings {
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
    /// Metrics settings.
    pub metrics: Option<MetricsSettings>,
}

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalStoreConfig {
    /// Store settings.
    pub store: StoreConfig,
    /// Observability settings.
    pub observability: ObservabilitySettings,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Store section.
    pub store: Option<ConfigFileStore>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// Metrics section.
    pub metrics: Option<MetricsSettings>,
}

/// Store section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileStore {
    /// Database path.
    pub location: Option<String>,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: Option<u64>,
    /// Read-only mode.
    pub read_only: Option<bool>,
    /// Journal mode.
    pub journal_mode: Option<String>,
}

impl LocalStoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::parse(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/localstore/` on macOS)
    /// 2. XDG config dir (`~/.config/localstore/` for Unix compatibility)
    ///
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("localstore").join("config.toml");
        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("localstore")
            .join("config.toml");

        for candidate in [platform_config, xdg_config] {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %candidate.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(store) = file.store {
            if let Some(location) = store.location {
                config.store.location = PathBuf::from(location);
            }
            if let Some(ms) = store.busy_timeout_ms {
                config.store.busy_timeout = Duration::from_millis(ms);
            }
            if let Some(read_only) = store.read_only {
                config.store.read_only = read_only;
            }
            config.store.journal_mode = store.journal_mode;
        }
        config.observability.logging = file.logging;
        config.observability.metrics = file.metrics;

        config
    }

    /// Applies `LOCALSTORE_*` environment variable overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup` using the `LOCALSTORE_*` keys.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(ENV_PATH) {
            self.store.location = PathBuf::from(path);
        }
        if let Some(ms) = lookup(ENV_BUSY_TIMEOUT_MS).and_then(|v| v.trim().parse::<u64>().ok()) {
            self.store.busy_timeout = Duration::from_millis(ms);
        }
        if let Some(read_only) = lookup(ENV_READ_ONLY).as_deref().and_then(parse_bool) {
            self.store.read_only = read_only;
        }
        if let Some(mode) = lookup(ENV_JOURNAL_MODE) {
            self.store.journal_mode = Some(mode);
        }

        let format = lookup(ENV_LOG_FORMAT);
        let filter = lookup(ENV_LOG_FILTER);
        let file = lookup(ENV_LOG_FILE);
        if format.is_some() || filter.is_some() || file.is_some() {
            let logging = self.observability.logging.get_or_insert_with(Default::default);
            if format.is_some() {
                logging.format = format;
            }
            if filter.is_some() {
                logging.filter = filter;
            }
            if file.is_some() {
                logging.file = file;
            }
        }

        if let Some(enabled) = lookup(ENV_METRICS_ENABLED).as_deref().and_then(parse_bool) {
            self.observability
                .metrics
                .get_or_insert_with(Default::default)
                .enabled = Some(enabled);
        }

        self
    }

    /// Sets the database location.
    #[must_use]
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.location = path.into();
        self
    }
}

/// Parses common boolean spellings.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LocalStoreConfig::new();
        assert_eq!(config.store.location, PathBuf::from("local.db"));
        assert_eq!(config.store.busy_timeout, Duration::from_millis(15_000));
        assert!(!config.store.read_only);
        assert!(config.store.journal_mode.is_none());
        assert!(config.observability.logging.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config = LocalStoreConfig::parse(
            r#"
            [store]
            location = "/data/app.db"
            busy_timeout_ms = 250
            read_only = true
            journal_mode = "WAL"

            [logging]
            format = "json"
            filter = "localstore=debug"

            [metrics]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.store.location, PathBuf::from("/data/app.db"));
        assert_eq!(config.store.busy_timeout, Duration::from_millis(250));
        assert!(config.store.read_only);
        assert_eq!(config.store.journal_mode.as_deref(), Some("WAL"));

        let logging = config.observability.logging.unwrap();
        assert_eq!(logging.format.as_deref(), Some("json"));
        assert_eq!(logging.filter.as_deref(), Some("localstore=debug"));
        assert!(logging.file.is_none());
        assert_eq!(config.observability.metrics.unwrap().enabled, Some(true));
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = LocalStoreConfig::parse("[store]\nlocation = \"x.db\"\n").unwrap();
        assert_eq!(config.store.location, PathBuf::from("x.db"));
        assert_eq!(config.store.busy_timeout, DEFAULT_BUSY_TIMEOUT);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = LocalStoreConfig::parse("[store\nlocation = 1").unwrap_err();
        assert!(matches!(
            err,
            Error::OperationFailed { ref operation, .. } if operation == "parse_config_file"
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = LocalStoreConfig::load_from_file(Path::new("/definitely/not/here.toml"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OperationFailed { ref operation, .. } if operation == "read_config_file"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\nbusy_timeout_ms = 1000\n").unwrap();

        let config = LocalStoreConfig::load_from_file(&path).unwrap();
        assert_eq!(config.store.busy_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides() {
        let config = LocalStoreConfig::new().with_overrides_from(lookup_from(&[
            (ENV_PATH, "/tmp/override.db"),
            (ENV_BUSY_TIMEOUT_MS, "500"),
            (ENV_READ_ONLY, "yes"),
            (ENV_JOURNAL_MODE, "wal"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_LOG_FILE, "/tmp/localstore.log"),
            (ENV_METRICS_ENABLED, "1"),
        ]));

        assert_eq!(config.store.location, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.store.busy_timeout, Duration::from_millis(500));
        assert!(config.store.read_only);
        assert_eq!(config.store.journal_mode.as_deref(), Some("wal"));

        let logging = config.observability.logging.unwrap();
        assert_eq!(logging.format.as_deref(), Some("json"));
        assert_eq!(logging.file.as_deref(), Some("/tmp/localstore.log"));
        assert!(logging.filter.is_none());
        assert_eq!(config.observability.metrics.unwrap().enabled, Some(true));
    }

    #[test]
    fn test_env_overrides_ignore_garbage() {
        let config = LocalStoreConfig::new().with_overrides_from(lookup_from(&[
            (ENV_BUSY_TIMEOUT_MS, "soon"),
            (ENV_READ_ONLY, "maybe"),
        ]));
        assert_eq!(config, LocalStoreConfig::new());
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let config = LocalStoreConfig::parse("[logging]\nformat = \"pretty\"\nfilter = \"warn\"\n")
            .unwrap()
            .with_overrides_from(lookup_from(&[(ENV_LOG_FORMAT, "json")]));

        let logging = config.observability.logging.unwrap();
        assert_eq!(logging.format.as_deref(), Some("json"));
        assert_eq!(logging.filter.as_deref(), Some("warn"));
    }

    #[test_case("true", Some(true); "true literal")]
    #[test_case("ON", Some(true); "uppercase on")]
    #[test_case(" 0 ", Some(false); "padded zero")]
    #[test_case("off", Some(false); "off literal")]
    #[test_case("", None; "empty")]
    #[test_case("2", None; "unknown number")]
    fn test_parse_bool(input: &str, expected: Option<bool>) {
        assert_eq!(parse_bool(input), expected);
    }
}
