pub mod config;
mod filters;
mod formatter;
#[cfg(test)]
pub(crate) mod test_writer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{LogFormat, LoggingConfig};

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный subscriber: фильтр (`RUST_LOG` или уровень из
/// конфига) и консольный layer. Повторный вызов возвращает ошибку.
pub fn init_logging(mut config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.apply_env_overrides();
    config.validate()?;

    let env_filter = filters::build_filter_from_config(&config);
    let console = formatter::build_formatter_from_config(&config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        format = %config.format,
        "Logging system initialized"
    );
    Ok(())
}
