use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::QueueError;

/// Кольцевой буфер с вытеснением самого старого элемента.
///
/// Неблокирующая запись никогда не отказывает: при заполненном буфере
/// самый старый элемент удаляется, размер остаётся равным ёмкости.
/// Подходит для ограниченной истории, где потеря старых данных допустима.
#[derive(Debug)]
pub struct RingbufQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: usize,
    put_event: Notify,
    get_event: Notify,
}

impl<T> RingbufQueue<T> {
    /// Создаёт буфер заданной ёмкости (минимум 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            put_event: Notify::new(),
            get_event: Notify::new(),
        }
    }

    /// Добавляет элемент без ожидания.
    ///
    /// # Возвращает
    /// - `None` если место было
    /// - `Some(oldest)` если пришлось вытеснить самый старый элемент
    pub fn put_nowait(
        &self,
        item: T,
    ) -> Option<T> {
        let evicted = {
            let mut items = self.items.lock();
            let evicted = if items.len() >= self.capacity {
                items.pop_front()
            } else {
                None
            };
            items.push_back(item);
            evicted
        };
        self.put_event.notify_one();
        evicted
    }

    /// Добавляет элемент, дожидаясь свободного места (без вытеснения).
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

    /// Извлекает самый старый элемент, ожидая его появления.
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

    /// Извлекает самый старый элемент без ожидания.
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

    /// Проверка места и запись под одной блокировкой.
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

impl<T: Clone> RingbufQueue<T> {
    /// Возвращает копию самого старого элемента, не извлекая его.
    pub fn peek(&self) -> Result<T, QueueError> {
        self.items.lock().front().cloned().ok_or(QueueError::Empty)
    }
}
