use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::QueueError;

/// Ограниченная FIFO-очередь.
///
/// Неблокирующая запись (`try_put`) отказывает при переполнении, содержимое
/// очереди при этом не меняется. Чтение (`get`) ожидает появления элемента.
#[derive(Debug)]
pub struct Queue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    /// Срабатывает при записи, его ждёт `get`.
    put_event: Notify,
    /// Срабатывает при чтении, его ждёт `put`.
    get_event: Notify,
}

impl<T> Queue<T> {
    /// Создаёт очередь заданной ёмкости (минимум 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            put_event: Notify::new(),
            get_event: Notify::new(),
        }
    }

    /// Пытается добавить элемент без ожидания.
    ///
    /// # Возвращает
    /// - `Ok(())` если элемент добавлен
    /// - `Err(QueueError::Full)` если очередь заполнена (элемент отброшен)
    pub fn try_put(
        &self,
        item: T,
    ) -> Result<(), QueueError> {
        self.push(item).map_err(|_| QueueError::Full)
    }

    /// Добавляет элемент, ожидая свободного места.
    pub async fn put(
        &self,
        mut item: T,
    ) {
        loop {
            let notified = self.get_event.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            match self.push(item) {
                Ok(()) => return,
                Err(back) => item = back,
            }
            notified.await;
        }
    }

    /// Извлекает элемент, ожидая его появления.
    pub async fn get(&self) -> T {
        loop {
            let notified = self.put_event.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Ok(item) = self.get_nowait() {
                return item;
            }
            notified.await;
        }
    }

    /// Извлекает элемент без ожидания.
    pub fn get_nowait(&self) -> Result<T, QueueError> {
        let item = self.items.lock().pop_front().ok_or(QueueError::Empty)?;
        self.get_event.notify_one();
        Ok(item)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.lock().len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push(
        &self,
        item: T,
    ) -> Result<(), T> {
        {
            let mut items = self.items.lock();
            if items.len() >= self.capacity {
                return Err(item);
            }
            items.push_back(item);
        }
        self.put_event.notify_one();
        Ok(())
    }
}
