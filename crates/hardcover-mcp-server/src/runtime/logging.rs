//! Logging config
//!
//! This module is only used by the main binary and provides the logging config
//! structure and the filter derived from it.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;

/// Logging related options
#[derive(Debug, Deserialize, JsonSchema)]
pub struct Logging {
    /// The log level to use for tracing
    #[serde(default = "defaults::log_level", deserialize_with = "level_from_str")]
    #[schemars(schema_with = "level_schema")]
    pub level: Level,

    /// The directory to write log files to. Logs go to stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Log file rotation period to use when log file path provided
    /// [default: hourly]
    #[serde(default = "defaults::rotation")]
    pub rotation: LogRotationKind,
}

/// How often a new log file is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogRotationKind {
    #[serde(alias = "Minutely", alias = "MINUTELY")]
    Minutely,
    #[serde(alias = "Hourly", alias = "HOURLY")]
    Hourly,
    #[serde(alias = "Daily", alias = "DAILY")]
    Daily,
    #[serde(alias = "Never", alias = "NEVER")]
    Never,
}

impl From<LogRotationKind> for Rotation {
    fn from(value: LogRotationKind) -> Self {
        match value {
            LogRotationKind::Minutely => Rotation::MINUTELY,
            LogRotationKind::Hourly => Rotation::HOURLY,
            LogRotationKind::Daily => Rotation::DAILY,
            LogRotationKind::Never => Rotation::NEVER,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            path: None,
            rotation: defaults::rotation(),
        }
    }
}

impl Logging {
    /// `RUST_LOG` directives on top of the configured level. At the default
    /// level the MCP protocol crate is limited to warnings.
    pub fn env_filter(&self) -> Result<EnvFilter, anyhow::Error> {
        let mut env_filter = EnvFilter::from_default_env().add_directive(self.level.into());

        if self.level == Level::INFO {
            env_filter = env_filter.add_directive("rmcp=warn".parse()?);
        }
        Ok(env_filter)
    }
}

fn level_from_str<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse()
        .map_err(|e| serde::de::Error::custom(format!("invalid log level `{raw}`: {e}")))
}

fn level_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
    /// Log level
    #[derive(JsonSchema)]
    #[schemars(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum LevelName {
        Trace,
        Debug,
        Info,
        Warn,
        Error,
    }

    LevelName::json_schema(generator)
}

mod defaults {
    use super::LogRotationKind;
    use tracing::Level;

    pub(super) const fn log_level() -> Level {
        Level::INFO
    }

    pub(super) const fn rotation() -> LogRotationKind {
        LogRotationKind::Hourly
    }
}
