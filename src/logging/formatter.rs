use std::io::{self, Stdout};

use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Консольный layer по конфигурации.
///
/// Возвращаем boxed trait-объект, чтобы стереть конкретный тип формата
/// (json/pretty/compact).
pub fn build_formatter_from_config<S>(config: &LoggingConfig) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stdout = io::stdout;
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_ids);

    match config.format {
        LogFormat::Json => Box::new(layer.json().with_current_span(true)),
        LogFormat::Pretty => Box::new(layer.pretty()),
        LogFormat::Compact => Box::new(layer.compact()),
    }
}

#[cfg(test)]
mod tests {
    use tracing::info;
    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    /// Тест проверяет, что layer строится для каждого формата и не паникует
    /// при логировании.
    #[test]
    fn test_every_format_builds() {
        for format in [LogFormat::Pretty, LogFormat::Compact, LogFormat::Json] {
            let cfg = LoggingConfig {
                format,
                with_ansi: false,
                ..Default::default()
            };
            let subscriber = Registry::default().with(build_formatter_from_config(&cfg));
            tracing::subscriber::with_default(subscriber, || {
                info!(format = %format, "formatter smoke test");
            });
        }
    }
}
