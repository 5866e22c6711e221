//! Logger configuration.

use serde::{Deserialize, Serialize};

/// Verbosity of the logger.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Everything
    Trace,
    /// Debugging details, such as pipeline state transitions
    Debug,
    /// Outcomes
    #[default]
    Info,
    /// Degraded results
    Warn,
    /// Failures only
    Error,
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

/// Reflects formatters in [`tracing_subscriber::fmt::format`]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// See [`tracing_subscriber::fmt::format::Full`]
    #[default]
    Full,
    /// See [`tracing_subscriber::fmt::format::Compact`]
    Compact,
    /// See [`tracing_subscriber::fmt::format::Pretty`]
    Pretty,
    /// See [`tracing_subscriber::fmt::format::Json`]
    Json,
}

/// Partial logger configuration as read from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UserLayer {
    /// Level of logging verbosity
    pub level: Option<Level>,
    /// Output format
    pub format: Option<Format>,
}

impl UserLayer {
    /// Fill the gaps with defaults.
    pub fn complete(self) -> Config {
        Config {
            level: self.level.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
        }
    }
}

/// Complete logger configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Level of logging verbosity
    pub level: Level,
    /// Output format
    pub format: Format,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_pretty_format_in_lowercase() {
        let value = Format::Pretty;
        let actual = serde_json::to_string(&value).unwrap();
        assert_eq!("\"pretty\"", actual);
    }

    #[test]
    fn levels_are_uppercase() {
        let layer: UserLayer = serde_json::from_str(r#"{"level": "DEBUG"}"#).unwrap();
        assert_eq!(
            layer.complete(),
            Config {
                level: Level::Debug,
                format: Format::Full
            }
        );
    }
}
