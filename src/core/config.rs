//! Configuration management for polygon-graph
//!
//! Settings come from `polygon-graph.toml` when present, then `PG_*`
//! environment variables, then command line flags.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Default configuration file looked up by [`Config::load`]
pub const DEFAULT_CONFIG_FILE: &str = "polygon-graph.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grouping configuration
    pub grouping: GroupingConfig,

    /// Graph builder configuration
    pub build: BuildConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How features without a value for the grouping field are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Leave them out of the graph entirely
    #[default]
    Skip,
    /// Collect them under a single unclassified vertex
    Unclassified,
}

/// Which polygon contacts produce an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchSemantics {
    /// Any shared point, boundary-only contact included
    #[default]
    Intersects,
    /// Interiors must overlap; boundary-only contact is not an edge
    Interior,
}

/// Serialized graph format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Infer from the output file extension
    #[default]
    Auto,
    /// Pretty printed JSON
    Json,
    /// MessagePack
    Msgpack,
    /// Bincode
    Bincode,
}

/// Grouping configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Null attribute handling
    pub null_policy: NullPolicy,
}

/// Graph builder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Edge semantics for boundary-only contact
    pub touch: TouchSemantics,

    /// Pre-filter candidate pairs by bounding rectangle
    pub use_bbox_index: bool,

    /// Worker threads for the pair sweep (0 = auto-detect, 1 = sequential)
    pub worker_threads: usize,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Graph file format
    pub format: OutputFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact)
    pub format: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            touch: TouchSemantics::Intersects,
            use_bbox_index: true,
            worker_threads: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl FromStr for NullPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip" => Ok(NullPolicy::Skip),
            "unclassified" => Ok(NullPolicy::Unclassified),
            _ => Err(Error::config(format!(
                "Invalid null policy: {}. Valid options: skip, unclassified",
                s
            ))),
        }
    }
}

impl FromStr for TouchSemantics {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "intersects" => Ok(TouchSemantics::Intersects),
            "interior" => Ok(TouchSemantics::Interior),
            _ => Err(Error::config(format!(
                "Invalid touch semantics: {}. Valid options: intersects, interior",
                s
            ))),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(OutputFormat::Auto),
            "json" => Ok(OutputFormat::Json),
            "msgpack" => Ok(OutputFormat::Msgpack),
            "bincode" => Ok(OutputFormat::Bincode),
            _ => Err(Error::config(format!(
                "Invalid output format: {}. Valid options: auto, json, msgpack, bincode",
                s
            ))),
        }
    }
}

impl Config {
    /// Load configuration from the default config file and environment variables
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any `PG_*` lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(policy) = lookup("PG_NULL_POLICY") {
            self.grouping.null_policy = policy.parse()?;
        }

        if let Some(touch) = lookup("PG_TOUCH") {
            self.build.touch = touch.parse()?;
        }

        if let Some(flag) = lookup("PG_USE_BBOX_INDEX") {
            self.build.use_bbox_index = flag.parse()
                .map_err(|e| Error::config(format!("Invalid bbox index flag: {}", e)))?;
        }

        if let Some(workers) = lookup("PG_WORKER_THREADS") {
            self.build.worker_threads = workers.parse()
                .map_err(|e| Error::config(format!("Invalid worker threads: {}", e)))?;
        }

        if let Some(format) = lookup("PG_OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }

        if let Some(level) = lookup("PG_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("PG_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.build.worker_threads > 1024 {
            return Err(Error::config("Too many worker threads (maximum 1024)"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }

    /// Get effective number of pair sweep workers
    pub fn effective_worker_threads(&self) -> usize {
        if self.build.worker_threads == 0 {
            // Auto-detect: use number of CPU cores
            num_cpus::get().max(1)
        } else {
            self.build.worker_threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.grouping.null_policy, NullPolicy::Skip);
        assert_eq!(config.build.touch, TouchSemantics::Intersects);
        assert!(config.build.use_bbox_index);
        assert_eq!(config.effective_worker_threads(), 1);
        assert_eq!(config.output.format, OutputFormat::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [grouping]
            null_policy = "unclassified"

            [build]
            touch = "interior"
            worker_threads = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.grouping.null_policy, NullPolicy::Unclassified);
        assert_eq!(config.build.touch, TouchSemantics::Interior);
        assert_eq!(config.build.worker_threads, 4);
        assert!(config.build.use_bbox_index);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_value() {
        let result = Config::from_toml_str("[build]\ntouch = \"sideways\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PG_NULL_POLICY", "unclassified"),
            ("PG_USE_BBOX_INDEX", "false"),
            ("PG_WORKER_THREADS", "0"),
            ("PG_OUTPUT_FORMAT", "msgpack"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.grouping.null_policy, NullPolicy::Unclassified);
        assert!(!config.build.use_bbox_index);
        assert!(config.effective_worker_threads() >= 1);
        assert_eq!(config.output.format, OutputFormat::Msgpack);
    }

    #[test]
    fn test_bad_env_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "PG_WORKER_THREADS").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.build.worker_threads = 5000;
        assert!(config.validate().is_err());
    }
}
