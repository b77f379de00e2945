use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// Фильтр событий: `RUST_LOG`, если задана, иначе директива из конфига.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    let directive = config.build_filter_directive();

    match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => match EnvFilter::try_new(&directive) {
            Ok(filter) => filter,
            Err(e) => {
                eprintln!(
                    "Invalid log filter directive from config ('{directive}'): {e}; falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::{fmt, prelude::*, registry::Registry};

    use super::*;
    use crate::logging::test_writer::VecMakeWriter;

    /// Тест проверяет, что некорректная директива отвергается `EnvFilter`,
    /// а значит сработает запасной фильтр.
    #[test]
    fn test_invalid_directive_is_rejected() {
        assert!(EnvFilter::try_new("this_is_invalid_directive!!").is_err());
    }

    /// Тест проверяет фильтрацию по уровню: info отбрасывается, warn
    /// проходит.
    #[test]
    fn test_envfilter_filters_levels() {
        let filter = EnvFilter::try_new("warn").unwrap();
        let writer = VecMakeWriter::default();
        let layer = fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_filter(filter);
        let _guard = tracing::subscriber::set_default(Registry::default().with(layer));

        tracing::info!("this is an info message that should be filtered out");
        tracing::warn!("this is a warn message that should pass through");

        let out = writer.contents();
        assert!(out.contains("this is a warn message"));
        assert!(!out.contains("this is an info message"));
    }
}
