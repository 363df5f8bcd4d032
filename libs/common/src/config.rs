//! Flow Utilities configuration
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `config/default.{toml,yaml,json}`
//! 3. `config/local.{toml,yaml,json}`
//! 4. An explicit file (`--config`)
//! 5. `FLOW_` prefixed environment variables (`FLOW_LOGGING__LEVEL=debug`)

use crate::{Error, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use flow_calc::DurationFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FLOW_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Language for unit words, token titles and currency layout
    #[serde(default = "default_language")]
    pub language: String,

    /// Reject unknown operators and division by zero
    #[serde(default)]
    pub strict_arithmetic: bool,

    /// Default output of the duration calculator
    #[serde(default)]
    pub duration_format: DurationFormat,

    /// JSON file holding the settings blob
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory, console only when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// JSON lines in the log file
    #[serde(default)]
    pub json: bool,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("flow-settings.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            strict_arithmetic: false,
            duration_format: DurationFormat::default(),
            settings_path: default_settings_path(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            json: false,
        }
    }
}

/// Figment with every configuration source merged
pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(FlowConfig::default()))
        .merge(Toml::file("config/default.toml"))
        .merge(Yaml::file("config/default.yaml"))
        .merge(Json::file("config/default.json"))
        // Local overrides (not committed to git)
        .merge(Toml::file("config/local.toml"))
        .merge(Yaml::file("config/local.yaml"))
        .merge(Json::file("config/local.json"));

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(file_provider(path)?);
    }

    Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

/// Load configuration from every source
pub fn load_config(explicit: Option<&Path>) -> Result<FlowConfig> {
    figment(explicit)?
        .extract()
        .map_err(|e| Error::config(format!("Failed to load configuration: {}", e)))
}

/// Load configuration from a specific file, no other sources
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<FlowConfig> {
    Figment::from(Serialized::defaults(FlowConfig::default()))
        .merge(file_provider(path.as_ref())?)
        .extract()
        .map_err(|e| Error::config(format!("Failed to load configuration from file: {}", e)))
}

/// Save configuration to a file, format chosen by extension
pub fn save_config_to_file<P: AsRef<Path>>(config: &FlowConfig, path: P) -> Result<()> {
    let path = path.as_ref();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = match extension(path)? {
        "toml" => toml::to_string_pretty(config).map_err(|e| Error::Serialization(e.to_string()))?,
        "yaml" | "yml" => {
            serde_yaml::to_string(config).map_err(|e| Error::Serialization(e.to_string()))?
        },
        "json" => serde_json::to_string_pretty(config)?,
        other => {
            return Err(Error::config(format!(
                "Unsupported config file format: {}",
                other
            )))
        },
    };

    std::fs::write(path, content)?;
    Ok(())
}

fn extension(path: &Path) -> Result<&str> {
    path.extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::config("Config file must have an extension"))
}

fn file_provider(path: &Path) -> Result<Figment> {
    let figment = match extension(path)? {
        "toml" => Figment::new().merge(Toml::file(path)),
        "yaml" | "yml" => Figment::new().merge(Yaml::file(path)),
        "json" => Figment::new().merge(Json::file(path)),
        other => {
            return Err(Error::config(format!(
                "Unsupported config file format: {}",
                other
            )))
        },
    };
    Ok(figment)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = FlowConfig::default();
        assert_eq!(config.language, "en");
        assert!(!config.strict_arithmetic);
        assert_eq!(config.duration_format, DurationFormat::Text);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_load_toml() {
        let file = write_temp(
            ".toml",
            r#"
language = "nl"
strict_arithmetic = true
duration_format = "seconds"

[logging]
level = "debug"
dir = "/var/log/flow"
"#,
        );

        let config = load_config_from_file(file.path()).unwrap();
        assert_eq!(config.language, "nl");
        assert!(config.strict_arithmetic);
        assert_eq!(config.duration_format, DurationFormat::Seconds);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/flow")));
        // Unset keys keep their defaults
        assert_eq!(config.settings_path, PathBuf::from("flow-settings.json"));
    }

    #[test]
    fn test_load_yaml_partial() {
        let file = write_temp(".yaml", "language: de\nlogging:\n  json: true\n");

        let config = load_config_from_file(file.path()).unwrap();
        assert_eq!(config.language, "de");
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".ini", "language=en");
        assert!(matches!(
            load_config_from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_value_rejected() {
        let file = write_temp(".json", r#"{"duration_format": "hours"}"#);
        assert!(load_config_from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = figment(Some(Path::new("/nonexistent/flow.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config = FlowConfig {
            language: "nl".to_string(),
            strict_arithmetic: true,
            ..Default::default()
        };

        for name in ["flow.toml", "flow.yaml", "flow.json"] {
            let path = dir.path().join("nested").join(name);
            save_config_to_file(&config, &path).unwrap();
            assert_eq!(load_config_from_file(&path).unwrap(), config);
        }
    }
}
