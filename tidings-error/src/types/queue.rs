use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки неблокирующих операций ограниченных очередей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Очередь заполнена, элемент не принят.
    #[error("queue is full")]
    Full,
    /// Очередь пуста.
    #[error("queue is empty")]
    Empty,
}

impl ErrorExt for QueueError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Full => StatusCode::QueueFull,
            Self::Empty => StatusCode::QueueEmpty,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_error_codes() {
        assert_eq!(QueueError::Full.status_code(), StatusCode::QueueFull);
        assert_eq!(QueueError::Empty.status_code(), StatusCode::QueueEmpty);
        assert_eq!(QueueError::Full.to_string(), "queue is full");
    }
}
