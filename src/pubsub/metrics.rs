use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Счётчики брокера.
#[derive(Debug, Default)]
pub struct BrokerMetrics {
    /// Общее количество вызовов `publish`
    pub(crate) published: AtomicU64,
    /// Попытки доставки (по одной на совпавшую подписку)
    pub(crate) deliveries: AtomicU64,
    /// Сообщения, отброшенные переполненной очередью
    pub(crate) dropped: AtomicU64,
    /// Сообщения, вытесненные из кольцевого буфера
    pub(crate) overwritten: AtomicU64,
    /// Сбои обработчиков и планирования
    pub(crate) failed: AtomicU64,
}

/// Снимок счётчиков на момент вызова.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub deliveries: u64,
    pub dropped: u64,
    pub overwritten: u64,
    pub failed: u64,
    pub diagnostics: u64,
}

impl BrokerMetrics {
    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(
        &self,
        diagnostics: u64,
    ) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            diagnostics,
        }
    }
}
