use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, error, info, trace, warn};

use super::Agent;
use crate::{DeliveryError, ErrorExt, UnsubscribeWarning};
use tidings_error::LogLevel;

/// Выводит событие на уровне, который выбирает статус-код ошибки.
macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => trace!($($arg)+),
            LogLevel::Debug => debug!($($arg)+),
            LogLevel::Info => info!($($arg)+),
            LogLevel::Warn => warn!($($arg)+),
            LogLevel::Error => error!($($arg)+),
        }
    };
}

/// Некритичная диагностика брокера.
///
/// Предупреждения (переполнение очереди, неизвестная отписка, сбой
/// обработчика) выводятся только при включённом Verbose, на уровне из
/// `StatusCode::log_level`. При выключенном Verbose остаётся лишь запись
/// уровня `trace` с кодом статуса, без текста предупреждения.
#[derive(Debug, Default)]
pub struct Diagnostics {
    verbose: AtomicBool,
    warn_on_evict: AtomicBool,
    emitted: AtomicU64,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose: AtomicBool::new(verbose),
            ..Default::default()
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    pub fn set_verbose(
        &self,
        on: bool,
    ) {
        self.verbose.store(on, Ordering::Relaxed);
    }

    /// Предупреждать ли о вытеснении из кольцевого буфера.
    pub fn warn_on_evict(&self) -> bool {
        self.warn_on_evict.load(Ordering::Relaxed)
    }

    pub fn set_warn_on_evict(
        &self,
        on: bool,
    ) {
        self.warn_on_evict.store(on, Ordering::Relaxed);
    }

    /// Сколько предупреждений было выведено.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub(crate) fn unsubscribe(
        &self,
        warning: &UnsubscribeWarning,
    ) {
        let status = warning.status_code();
        if !self.verbose() {
            trace!(%status, "unsubscribe diagnostic suppressed");
            return;
        }
        self.emitted.fetch_add(1, Ordering::Relaxed);
        emit!(
            status.log_level(),
            tags = ?warning.metrics_tags(),
            "{warning}"
        );
    }

    pub(crate) fn delivery(
        &self,
        topic: &str,
        agent: &Agent,
        err: &DeliveryError,
    ) {
        let status = err.status_code();
        let quiet = match err {
            DeliveryError::RingOverwrite => !self.warn_on_evict(),
            _ => false,
        };
        if quiet || !self.verbose() {
            trace!(topic, %status, "delivery diagnostic suppressed");
            return;
        }
        self.emitted.fetch_add(1, Ordering::Relaxed);
        emit!(
            status.log_level(),
            topic,
            agent = %agent,
            tags = ?err.metrics_tags(),
            "{err}"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, registry::Registry};

    use super::*;
    use crate::{logging::test_writer::VecMakeWriter, primitives::Queue, HandlerError};

    fn capture() -> (VecMakeWriter, tracing::subscriber::DefaultGuard) {
        let writer = VecMakeWriter::default();
        let layer = fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_filter(LevelFilter::TRACE);
        let guard = tracing::subscriber::set_default(Registry::default().with(layer));
        (writer, guard)
    }

    fn queue_agent() -> Agent {
        Agent::Queue(Arc::new(Queue::new(1)))
    }

    /// Тест проверяет, что без Verbose предупреждения не считаются.
    #[test]
    fn test_quiet_by_default() {
        let d = Diagnostics::default();
        assert!(!d.verbose());
        d.delivery("t", &queue_agent(), &DeliveryError::QueueFull);
        d.unsubscribe(&UnsubscribeWarning::UnknownTopic { topic: "t".into() });
        assert_eq!(d.emitted(), 0);
    }

    /// Тест проверяет счётчик при включённом Verbose.
    #[test]
    fn test_verbose_counts() {
        let d = Diagnostics::new(true);
        d.delivery("t", &queue_agent(), &DeliveryError::QueueFull);
        d.unsubscribe(&UnsubscribeWarning::UnknownTopic { topic: "t".into() });
        assert_eq!(d.emitted(), 2);
    }

    /// Тест проверяет, что о вытеснении предупреждаем только по запросу.
    #[test]
    fn test_ring_overwrite_needs_opt_in() {
        let d = Diagnostics::new(true);
        d.delivery("t", &queue_agent(), &DeliveryError::RingOverwrite);
        assert_eq!(d.emitted(), 0);

        d.set_warn_on_evict(true);
        d.delivery("t", &queue_agent(), &DeliveryError::RingOverwrite);
        assert_eq!(d.emitted(), 1);

        d.set_verbose(false);
        d.delivery("t", &queue_agent(), &DeliveryError::RingOverwrite);
        assert_eq!(d.emitted(), 1);
    }

    /// Тест проверяет, что без Verbose текст предупреждения не попадает в лог
    /// ни на каком уровне, остаётся только код статуса.
    #[test]
    fn test_quiet_hides_warning_text() {
        let (writer, _guard) = capture();
        let d = Diagnostics::default();
        d.delivery("t", &queue_agent(), &DeliveryError::QueueFull);
        d.unsubscribe(&UnsubscribeWarning::UnknownTopic { topic: "rats".into() });

        let out = writer.contents();
        assert!(out.contains("delivery diagnostic suppressed"));
        assert!(out.contains("2010"));
        assert!(!out.contains("queue full, message dropped"));
        assert!(!out.contains("unknown topic rats"));
        assert!(!out.contains("WARN"));
    }

    /// Тест проверяет, что уровень записи берётся из статус-кода.
    #[test]
    fn test_level_follows_status_code() {
        let (writer, _guard) = capture();
        let d = Diagnostics::new(true);

        d.delivery("t", &queue_agent(), &DeliveryError::QueueFull);
        let out = writer.contents();
        assert!(out.contains("WARN"));
        assert!(out.contains("queue full, message dropped"));
        assert!(out.contains("broker_delivery"));
        assert!(!out.contains("ERROR"));

        d.delivery(
            "t",
            &queue_agent(),
            &DeliveryError::HandlerFailed(HandlerError::new("nope")),
        );
        let out = writer.contents();
        assert!(out.contains("ERROR"));
        assert!(out.contains("handler failed: nope"));
        assert_eq!(d.emitted(), 2);
    }
}
