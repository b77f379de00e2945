use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::{
    invoker, Arg, BrokerMetrics, Diagnostics, IntoAgent, MetricsSnapshot, Payload, Registration,
    Schedule, SubscriptionId, SubscriptionTable, TokioScheduler, TopicKey,
};
use crate::{
    config::Settings, pubsub::table::Miss, DeliveryError, SubscribeError, UnsubscribeWarning,
};

/// Брокер Pub/Sub сообщений.
///
/// Поддерживает:
/// - Точные подписки и подписки по шаблону (regex или glob)
/// - Пять видов агентов: синхронный и асинхронный обработчики, сигнал,
///   ограниченная очередь и кольцевой буфер
/// - Связанные аргументы подписки, передаваемые при каждой доставке
/// - Отписку по агенту и аргументам или по [`SubscriptionId`]
/// - Диагностику сбоев доставки, включаемую флагом Verbose
///
/// Брокер создаётся явно и передаётся по ссылке (обычно как
/// `Arc<Broker>`). Реестр защищён `RwLock`, но блокировка не удерживается
/// во время доставки: обработчик может сам подписываться, отписываться и
/// публиковать.
pub struct Broker {
    /// Реестр подписок
    table: RwLock<SubscriptionTable>,
    /// Следующий идентификатор подписки
    next_id: AtomicU64,
    /// Флаги Verbose/warn_on_evict и счётчик предупреждений
    diagnostics: Diagnostics,
    /// Запуск асинхронных обработчиков
    scheduler: Arc<dyn Schedule>,
    /// Счётчики публикаций и сбоев
    metrics: BrokerMetrics,
}

impl Broker {
    /// Создаёт брокер с планировщиком tokio без лимита и выключенным
    /// Verbose.
    pub fn new() -> Self {
        Self::with_scheduler(Arc::new(TokioScheduler::new()))
    }

    /// Создаёт брокер с заданным планировщиком.
    pub fn with_scheduler(scheduler: Arc<dyn Schedule>) -> Self {
        Self {
            table: RwLock::new(SubscriptionTable::new()),
            next_id: AtomicU64::new(1),
            diagnostics: Diagnostics::default(),
            scheduler,
            metrics: BrokerMetrics::default(),
        }
    }

    /// Создаёт брокер по настройкам: Verbose, предупреждения о вытеснении
    /// и лимит одновременно выполняющихся асинхронных обработчиков.
    pub fn from_settings(settings: &Settings) -> Self {
        let scheduler = match settings.max_in_flight {
            Some(limit) => TokioScheduler::with_limit(limit),
            None => TokioScheduler::new(),
        };
        let broker = Self::with_scheduler(Arc::new(scheduler));
        broker.diagnostics.set_verbose(settings.verbose);
        broker
            .diagnostics
            .set_warn_on_evict(settings.warn_on_evict);
        broker
    }

    pub fn verbose(&self) -> bool {
        self.diagnostics.verbose()
    }

    /// Включает или выключает вывод некритичной диагностики.
    pub fn set_verbose(
        &self,
        on: bool,
    ) {
        self.diagnostics.set_verbose(on);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Подписывает агента без связанных аргументов.
    pub fn subscribe<K, A>(
        &self,
        key: K,
        agent: A,
    ) -> Result<SubscriptionId, SubscribeError>
    where
        K: Into<TopicKey>,
        A: IntoAgent,
    {
        self.subscribe_with(key, agent, std::iter::empty::<Arg>())
    }

    /// Подписывает агента на ключ топика.
    ///
    /// `args` передаются агенту при каждой доставке. Повторная подписка
    /// того же агента создаёт ещё одну запись.
    ///
    /// # Ошибки
    /// [`SubscribeError::InvalidAgent`], если значение не является агентом.
    /// Реестр в этом случае не меняется.
    pub fn subscribe_with<K, A, I>(
        &self,
        key: K,
        agent: A,
        args: I,
    ) -> Result<SubscriptionId, SubscribeError>
    where
        K: Into<TopicKey>,
        A: IntoAgent,
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let agent = agent.into_agent()?;
        let key = key.into();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(topic = %key, agent = %agent, id = %id, "subscribe");

        let registration = Registration {
            id,
            agent,
            args: args.into_iter().map(Into::into).collect(),
        };
        self.table.write().insert(key, registration);
        Ok(id)
    }

    /// Отписывает агента, подписанного без аргументов.
    pub fn unsubscribe<K, A>(
        &self,
        key: K,
        agent: A,
    ) -> bool
    where
        K: Into<TopicKey>,
        A: IntoAgent,
    {
        self.unsubscribe_with(key, agent, std::iter::empty::<Arg>())
    }

    /// Удаляет первую подписку под `key` с тем же агентом (по
    /// идентичности) и равными аргументами.
    ///
    /// Никогда не завершается ошибкой: если удалять нечего, выводится
    /// предупреждение (при Verbose) и возвращается `false`. Неизвестный
    /// топик проверяется раньше агента.
    pub fn unsubscribe_with<K, A, I>(
        &self,
        key: K,
        agent: A,
        args: I,
    ) -> bool
    where
        K: Into<TopicKey>,
        A: IntoAgent,
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let key = key.into();
        if !self.table.read().contains_key(&key) {
            self.diagnostics
                .unsubscribe(&UnsubscribeWarning::UnknownTopic {
                    topic: key.to_string(),
                });
            return false;
        }
        let agent = match agent.into_agent() {
            Ok(agent) => agent,
            Err(err) => {
                let agent = match err {
                    SubscribeError::InvalidAgent { type_name } => type_name,
                    other => other.to_string(),
                };
                self.diagnostics
                    .unsubscribe(&UnsubscribeWarning::InvalidAgent {
                        topic: key.to_string(),
                        agent,
                    });
                return false;
            }
        };
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();

        let removed = self.table.write().remove(&key, &agent, &args);
        match removed {
            Ok(reg) => {
                debug!(topic = %key, agent = %agent, id = %reg.id, "unsubscribe");
                true
            }
            Err(miss) => {
                let warning = match miss {
                    Miss::UnknownTopic => UnsubscribeWarning::UnknownTopic {
                        topic: key.to_string(),
                    },
                    Miss::UnknownAgent => UnsubscribeWarning::UnknownAgent {
                        topic: key.to_string(),
                        agent: agent.to_string(),
                    },
                };
                self.diagnostics.unsubscribe(&warning);
                false
            }
        }
    }

    /// Удаляет ровно ту подписку, которую вернул `subscribe`.
    pub fn unsubscribe_id(
        &self,
        id: SubscriptionId,
    ) -> bool {
        let removed = self.table.write().remove_id(id);
        match removed {
            Some((key, reg)) => {
                debug!(topic = %key, agent = %reg.agent, id = %id, "unsubscribe");
                true
            }
            None => {
                self.diagnostics
                    .unsubscribe(&UnsubscribeWarning::UnknownId { id: id.get() });
                false
            }
        }
    }

    /// Публикует сообщение в топик.
    ///
    /// Все подписки, чей ключ совпадает с `topic`, получают доставку в
    /// порядке подписки. Синхронные доставки завершаются до возврата,
    /// асинхронные обработчики только планируются. Сбой одной доставки не
    /// мешает остальным и не возвращается вызывающему коду.
    ///
    /// Возвращает число совпавших подписок.
    pub fn publish(
        &self,
        topic: &str,
        payload: impl Into<Payload>,
    ) -> usize {
        BrokerMetrics::incr(&self.metrics.published);
        let payload = payload.into();
        let matched = self.table.read().matching(topic);
        if matched.is_empty() {
            trace!(topic, "publish: no subscribers");
            return 0;
        }

        let topic: Arc<str> = Arc::from(topic);
        for registration in &matched {
            BrokerMetrics::incr(&self.metrics.deliveries);
            let Err(err) =
                invoker::dispatch(registration, &topic, &payload, self.scheduler.as_ref())
            else {
                continue;
            };
            let counter = match err {
                DeliveryError::QueueFull => &self.metrics.dropped,
                DeliveryError::RingOverwrite => &self.metrics.overwritten,
                _ => &self.metrics.failed,
            };
            BrokerMetrics::incr(counter);
            self.diagnostics
                .delivery(&topic, &registration.agent, &err);
        }
        trace!(topic = %topic, deliveries = matched.len(), "publish");
        matched.len()
    }

    /// Общее число подписок.
    pub fn subscription_count(&self) -> usize {
        self.table.read().len()
    }

    /// Число ключей топиков, под которыми есть подписки.
    pub fn topic_count(&self) -> usize {
        self.table.read().topic_count()
    }

    /// Ключи топиков в порядке первой подписки.
    pub fn topics(&self) -> Vec<TopicKey> {
        self.table.read().keys()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.diagnostics.emitted())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
