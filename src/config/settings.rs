use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Настройки брокера.
///
/// Читаются из переменных окружения с префиксом `TIDINGS_`, например
/// `TIDINGS_VERBOSE=true` или `TIDINGS_MAX_IN_FLIGHT=64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Выводить некритичную диагностику
    pub verbose: bool,
    /// Предупреждать о вытеснении из кольцевого буфера (только при Verbose)
    pub warn_on_evict: bool,
    /// Лимит одновременно выполняющихся асинхронных обработчиков
    pub max_in_flight: Option<usize>,
    /// Уровень логирования по умолчанию
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            verbose: false,
            warn_on_evict: false,
            max_in_flight: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix("TIDINGS"))
    }

    fn load_from(env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default("verbose", false)?
            .set_default("warn_on_evict", false)?
            .set_default("log_level", "info")?
            .add_source(env.try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    /// Конфигурация логирования с уровнем из настроек.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            ..LoggingConfig::default()
        }
    }
}
