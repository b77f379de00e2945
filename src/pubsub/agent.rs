//! Агенты: получатели сообщений брокера.
//!
//! Поддерживается ровно пять видов агентов. Вид определяется один раз при
//! подписке (через [`IntoAgent`]), а не при каждой публикации.

use std::{any::Any, fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

use super::{Delivery, Message};
use crate::{
    primitives::{Queue, RingbufQueue, Signal},
    HandlerError, SubscribeError,
};

/// Результат синхронного обработчика.
pub type HandlerResult = Result<(), HandlerError>;

type SyncFn = dyn Fn(&Delivery) -> HandlerResult + Send + Sync;
type AsyncFn = dyn Fn(Delivery) -> BoxFuture<'static, ()> + Send + Sync;

/// Синхронный обработчик: вызывается прямо внутри `publish`.
#[derive(Clone)]
pub struct SyncHandler {
    name: Arc<str>,
    f: Arc<SyncFn>,
}

impl SyncHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Delivery) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(std::any::type_name::<F>()),
            f: Arc::new(f),
        }
    }

    /// Задаёт имя для диагностики.
    pub fn named(
        mut self,
        name: &str,
    ) -> Self {
        self.name = Arc::from(name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(
        &self,
        delivery: &Delivery,
    ) -> HandlerResult {
        (self.f)(delivery)
    }

    fn same_as(
        &self,
        other: &Self,
    ) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.f), Arc::as_ptr(&other.f))
    }
}

/// Асинхронный обработчик: для каждой доставки планируется отдельная задача,
/// `publish` её не дожидается.
#[derive(Clone)]
pub struct AsyncHandler {
    name: Arc<str>,
    f: Arc<AsyncFn>,
}

impl AsyncHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Delivery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: Arc::from(std::any::type_name::<F>()),
            f: Arc::new(move |d: Delivery| f(d).boxed()),
        }
    }

    /// Задаёт имя для диагностики.
    pub fn named(
        mut self,
        name: &str,
    ) -> Self {
        self.name = Arc::from(name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Создаёт задачу для доставки, не запуская её.
    pub fn call(
        &self,
        delivery: Delivery,
    ) -> BoxFuture<'static, ()> {
        (self.f)(delivery)
    }

    fn same_as(
        &self,
        other: &Self,
    ) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.f), Arc::as_ptr(&other.f))
    }
}

impl fmt::Debug for SyncHandler {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_tuple("SyncHandler").field(&self.name).finish()
    }
}

impl fmt::Debug for AsyncHandler {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_tuple("AsyncHandler").field(&self.name).finish()
    }
}

/// Вид агента.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Sync,
    Async,
    Signal,
    Queue,
    Ring,
}

impl fmt::Display for AgentKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Sync => "sync-handler",
            Self::Async => "async-handler",
            Self::Signal => "signal",
            Self::Queue => "queue",
            Self::Ring => "ring-queue",
        })
    }
}

/// Получатель сообщений.
///
/// Брокер хранит только разделяемую ссылку: временем жизни очередей и
/// сигналов управляет вызывающий код.
#[derive(Debug, Clone)]
pub enum Agent {
    /// Вызывается синхронно с `(topic, payload, args)`.
    Sync(SyncHandler),
    /// Планируется как отдельная задача с теми же аргументами.
    Async(AsyncHandler),
    /// У сигнала вызывается `set`, нагрузка не передаётся.
    Signal(Arc<Signal>),
    /// В очередь кладётся `(topic, payload)`, при переполнении сообщение
    /// отбрасывается.
    Queue(Arc<Queue<Message>>),
    /// В кольцевой буфер кладётся `(topic, payload, args)`, при
    /// переполнении вытесняется самый старый элемент.
    Ring(Arc<RingbufQueue<Delivery>>),
}

impl Agent {
    /// Определяет вид агента у произвольного значения.
    ///
    /// Значение, не являющееся ни одним из пяти видов агентов, отвергается
    /// с [`SubscribeError::InvalidAgent`].
    pub fn classify<T: Any + Send + Sync>(value: T) -> Result<Self, SubscribeError> {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        let boxed = match boxed.downcast::<Agent>() {
            Ok(agent) => return Ok(*agent),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<SyncHandler>() {
            Ok(h) => return Ok(Self::Sync(*h)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<AsyncHandler>() {
            Ok(h) => return Ok(Self::Async(*h)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Arc<Signal>>() {
            Ok(s) => return Ok(Self::Signal(*s)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Arc<Queue<Message>>>() {
            Ok(q) => return Ok(Self::Queue(*q)),
            Err(other) => other,
        };
        match boxed.downcast::<Arc<RingbufQueue<Delivery>>>() {
            Ok(rq) => Ok(Self::Ring(*rq)),
            Err(_) => Err(SubscribeError::InvalidAgent {
                type_name: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Self::Sync(_) => AgentKind::Sync,
            Self::Async(_) => AgentKind::Async,
            Self::Signal(_) => AgentKind::Signal,
            Self::Queue(_) => AgentKind::Queue,
            Self::Ring(_) => AgentKind::Ring,
        }
    }

    /// Совпадение по идентичности (тот же обработчик или тот же объект),
    /// а не по значению.
    pub fn same_as(
        &self,
        other: &Agent,
    ) -> bool {
        match (self, other) {
            (Self::Sync(a), Self::Sync(b)) => a.same_as(b),
            (Self::Async(a), Self::Async(b)) => a.same_as(b),
            (Self::Signal(a), Self::Signal(b)) => Arc::ptr_eq(a, b),
            (Self::Queue(a), Self::Queue(b)) => Arc::ptr_eq(a, b),
            (Self::Ring(a), Self::Ring(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Sync(h) => write!(f, "{}({})", self.kind(), h.name()),
            Self::Async(h) => write!(f, "{}({})", self.kind(), h.name()),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

/// Преобразование в агента при подписке и отписке.
pub trait IntoAgent {
    fn into_agent(self) -> Result<Agent, SubscribeError>;
}

impl IntoAgent for Agent {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(self)
    }
}

impl IntoAgent for SyncHandler {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(Agent::Sync(self))
    }
}

impl IntoAgent for AsyncHandler {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(Agent::Async(self))
    }
}

impl IntoAgent for Arc<Signal> {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(Agent::Signal(self))
    }
}

impl IntoAgent for Arc<Queue<Message>> {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(Agent::Queue(self))
    }
}

impl IntoAgent for Arc<RingbufQueue<Delivery>> {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Ok(Agent::Ring(self))
    }
}

impl<T: IntoAgent + Clone> IntoAgent for &T {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        self.clone().into_agent()
    }
}

/// Значение, вид которого определяется во время выполнения.
///
/// ```ignore
/// let err = broker.subscribe("foo_topic", AnyAgent("rubbish_agent"));
/// assert!(matches!(err, Err(SubscribeError::InvalidAgent { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct AnyAgent<T>(pub T);

impl<T: Any + Send + Sync> IntoAgent for AnyAgent<T> {
    fn into_agent(self) -> Result<Agent, SubscribeError> {
        Agent::classify(self.0)
    }
}
