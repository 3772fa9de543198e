use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main monlog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Filter for monlog's own log output and forwarded events
    pub log_level: LogLevel,
    /// Append log output to this file instead of stderr
    pub log_file: Option<PathBuf>,
    /// Backend name, resolved through the logger registry
    pub logger: String,
    /// Per event type level overrides, merged over the defaults
    pub levels: IndexMap<String, String>,
    /// Redirect the process-wide error channel to the backend
    pub capture_errors: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_file: None,
            logger: "log".to_string(),
            levels: IndexMap::new(),
            capture_errors: true,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check MONLOG_CONFIG env var
        if let Ok(env_path) = std::env::var("MONLOG_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from MONLOG_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/monlog/monlog.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("monlog").join("monlog.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./monlog.yaml (for development)
        let local_config = PathBuf::from("monlog.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.logger, "log");
        assert!(config.levels.is_empty());
        assert!(config.capture_errors);
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Debug.as_filter(), log::LevelFilter::Debug);
        assert_eq!(LogLevel::Off.as_filter(), log::LevelFilter::Off);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug\nlevels:\n  ops: warn\n  ping: trace").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.logger, "log");
        assert_eq!(config.levels.get("ops").map(String::as_str), Some("warn"));
        let keys: Vec<&str> = config.levels.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ops", "ping"]);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/monlog.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_invalid_yaml_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level: [not, a, level]").unwrap();
        assert!(Config::load(Some(&file.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/var/log/monlog.log");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/var/log/monlog.log"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        // SAFETY: Test runs single-threaded, env var is test-specific
        unsafe {
            std::env::set_var("MONLOG_TEST_VAR", "/custom/path");
        }
        let path = PathBuf::from("$MONLOG_TEST_VAR/monlog.log");
        assert_eq!(Config::expand_path(&path), PathBuf::from("/custom/path/monlog.log"));
        unsafe {
            std::env::remove_var("MONLOG_TEST_VAR");
        }
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.levels.insert("ops".to_string(), "warn".to_string());
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.levels, config.levels);
        assert_eq!(parsed.log_level, config.log_level);
    }
}
