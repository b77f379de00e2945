use std::{fmt, sync::Arc};

use bytes::Bytes;
use serde::Serialize;

/// Связанный аргумент подписки.
///
/// Передаётся при подписке и повторяется при каждой доставке. Сравнивается
/// по значению при отписке.
pub type Arg = serde_json::Value;

/// Полезная нагрузка публикуемого сообщения.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bytes(Bytes),
    String(String),
    Json(serde_json::Value),
}

impl Payload {
    /// Сериализует значение в JSON-нагрузку.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Строковое представление, если нагрузка строковая.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Json(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Self::String(s) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(b))
    }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// Сообщение для ограниченной очереди: топик и нагрузка.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub topic: Arc<str>,
    pub payload: Payload,
}

impl Message {
    pub fn new(
        topic: impl Into<Arc<str>>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Доставка для обработчиков и кольцевого буфера: топик, нагрузка и
/// связанные аргументы подписки.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub topic: Arc<str>,
    pub payload: Payload,
    pub args: Arc<[Arg]>,
}

impl Delivery {
    pub fn new(
        topic: impl Into<Arc<str>>,
        payload: impl Into<Payload>,
        args: Arc<[Arg]>,
    ) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            args,
        }
    }

    /// Связанный аргумент по индексу.
    pub fn arg(
        &self,
        index: usize,
    ) -> Option<&Arg> {
        self.args.get(index)
    }

    /// Отбрасывает аргументы.
    pub fn into_message(self) -> Message {
        Message {
            topic: self.topic,
            payload: self.payload,
        }
    }
}
