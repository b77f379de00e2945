use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Событие без полезной нагрузки.
///
/// `set` будит всех ожидающих и идемпотентен. Флаг остаётся поднятым до
/// явного `clear`, поэтому ожидающий, пришедший после `set`, не блокируется.
#[derive(Debug, Default)]
pub struct Signal {
    flag: AtomicBool,
    notify: Notify,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Поднимает флаг и будит всех ожидающих.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Сбрасывает флаг.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Ожидает поднятия флага. Флаг не сбрасывается.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Регистрируемся до проверки флага, чтобы не потерять `set`
            // между проверкой и ожиданием.
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::timeout;

    use super::*;

    /// Тест проверяет, что `wait` возвращается сразу, если флаг уже поднят.
    #[tokio::test]
    async fn test_wait_when_already_set() {
        let signal = Signal::new();
        signal.set();
        timeout(Duration::from_millis(50), signal.wait())
            .await
            .expect("wait must return immediately");
        assert!(signal.is_set());
    }

    /// Тест проверяет, что `set` будит всех ожидающих задач.
    #[tokio::test]
    async fn test_set_wakes_all_waiters() {
        let signal = Arc::new(Signal::new());
        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let s = Arc::clone(&signal);
                tokio::spawn(async move { s.wait().await })
            })
            .collect();

        tokio::task::yield_now().await;
        signal.set();

        for w in waiters {
            timeout(Duration::from_millis(100), w)
                .await
                .expect("waiter timed out")
                .expect("waiter panicked");
        }
    }

    /// Тест проверяет, что после `clear` ожидание снова блокируется.
    #[tokio::test]
    async fn test_clear_blocks_again() {
        let signal = Signal::new();
        signal.set();
        signal.set();
        signal.clear();
        assert!(!signal.is_set());
        assert!(timeout(Duration::from_millis(20), signal.wait())
            .await
            .is_err());
    }
}
