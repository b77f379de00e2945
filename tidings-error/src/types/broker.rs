use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки подписки. Единственный вид ошибок, который брокер возвращает
/// вызывающему коду.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    /// Объект не является ни одним из поддерживаемых видов агентов.
    #[error("invalid agent: {type_name} is not a handler, signal or queue")]
    InvalidAgent { type_name: String },

    /// Шаблон топика не удалось скомпилировать.
    #[error("invalid topic pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Предупреждения при отписке. Никогда не возвращаются как `Err`,
/// только логируются при включённом Verbose.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsubscribeWarning {
    /// Для ключа нет ни одной подписки.
    #[error("unsubscribe: unknown topic {topic}")]
    UnknownTopic { topic: String },

    /// Под ключом нет подписки с таким агентом и аргументами.
    #[error("unsubscribe: unknown agent {agent} for topic {topic}")]
    UnknownAgent { topic: String, agent: String },

    /// Объект не является агентом, значит и подписки быть не может.
    #[error("unsubscribe: invalid agent {agent} for topic {topic}")]
    InvalidAgent { topic: String, agent: String },

    /// Подписки с таким идентификатором нет.
    #[error("unsubscribe: unknown subscription id {id}")]
    UnknownId { id: u64 },
}

/// Ошибки планировщика асинхронных задач.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Вызов вне среды исполнения tokio.
    #[error("no async runtime available")]
    NoRuntime,

    /// Превышен лимит одновременно выполняющихся задач.
    #[error("scheduler saturated ({limit} tasks in flight)")]
    Saturated { limit: usize },
}

/// Ошибка, которую может вернуть синхронный обработчик.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct HandlerError {
    pub reason: String,
}

impl HandlerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Оборачивает произвольную ошибку, сохраняя её текст.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }
}

/// Сбой доставки одному агенту. Брокер не пробрасывает его наружу,
/// а превращает в диагностику.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Ограниченная очередь заполнена, новое сообщение отброшено.
    #[error("queue full, message dropped")]
    QueueFull,

    /// Кольцевой буфер заполнен, самое старое сообщение вытеснено.
    #[error("ring buffer full, oldest message overwritten")]
    RingOverwrite,

    /// Синхронный обработчик вернул ошибку.
    #[error("handler failed: {0}")]
    HandlerFailed(#[from] HandlerError),

    /// Синхронный обработчик запаниковал.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    /// Асинхронный обработчик не удалось запланировать.
    #[error("failed to schedule handler: {0}")]
    Schedule(#[from] ScheduleError),
}

////////////////////////////////////////////////////////////////////////////////
// ErrorExt
////////////////////////////////////////////////////////////////////////////////

impl ErrorExt for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAgent { .. } => StatusCode::InvalidAgent,
            Self::InvalidPattern { .. } => StatusCode::InvalidPattern,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "broker_subscribe".to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        match self {
            Self::InvalidAgent { type_name } => tags.push(("agent_type", type_name.clone())),
            Self::InvalidPattern { pattern, .. } => tags.push(("pattern", pattern.clone())),
        }
        tags
    }
}

impl ErrorExt for UnsubscribeWarning {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAgent { .. } => StatusCode::InvalidAgent,
            _ => StatusCode::NotFound,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for ScheduleError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoRuntime => StatusCode::NoRuntime,
            Self::Saturated { .. } => StatusCode::Saturated,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for HandlerError {
    fn status_code(&self) -> StatusCode {
        StatusCode::HandlerFailed
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for DeliveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::QueueFull => StatusCode::QueueFull,
            Self::RingOverwrite => StatusCode::Overwritten,
            Self::HandlerFailed(_) | Self::HandlerPanicked(_) => StatusCode::HandlerFailed,
            Self::Schedule(e) => e.status_code(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", "broker_delivery".to_string()),
            ("status_code", self.status_code().to_string()),
        ]
    }
}
