use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Формат вывода консольного лога.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

/// Конфигурация логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень: trace, debug, info, warn, error
    pub level: String,
    pub format: LogFormat,
    /// Выводить target события
    pub with_target: bool,
    pub with_ansi: bool,
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: true,
            with_ansi: true,
            with_thread_ids: false,
        }
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl LoggingConfig {
    /// Переопределяет уровень и формат из `TIDINGS_LOG_LEVEL` и
    /// `TIDINGS_LOG_FORMAT`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("TIDINGS_LOG_LEVEL") {
            self.level = level.to_ascii_lowercase();
        }
        if let Ok(format) = env::var("TIDINGS_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(e) => eprintln!("Ignoring TIDINGS_LOG_FORMAT: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "invalid log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            ));
        }
        Ok(())
    }

    /// Директива для `EnvFilter`, например `"tidings=debug,warn"`.
    pub fn build_filter_directive(&self) -> String {
        format!("{}={},warn", env!("CARGO_CRATE_NAME"), self.level)
    }
}
