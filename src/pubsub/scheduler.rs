use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::{runtime::Handle, sync::Semaphore};

use crate::ScheduleError;

/// Планировщик задач для асинхронных обработчиков.
///
/// Задача запускается «выстрелил и забыл»: брокер не ждёт её завершения и
/// не запрашивает её состояние.
pub trait Schedule: Send + Sync {
    fn schedule(
        &self,
        task: BoxFuture<'static, ()>,
    ) -> Result<(), ScheduleError>;
}

/// Планировщик поверх текущего рантайма tokio.
///
/// С лимитом (`with_limit`) одновременно выполняется не больше `limit` задач,
/// сверх лимита планирование отказывает с [`ScheduleError::Saturated`].
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    permits: Option<(Arc<Semaphore>, usize)>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Some((Arc::new(Semaphore::new(limit)), limit)),
        }
    }

    /// Число задач, которые ещё можно запустить (`None`, если лимита нет).
    pub fn available(&self) -> Option<usize> {
        self.permits.as_ref().map(|(s, _)| s.available_permits())
    }
}

impl Schedule for TokioScheduler {
    fn schedule(
        &self,
        task: BoxFuture<'static, ()>,
    ) -> Result<(), ScheduleError> {
        let handle = Handle::try_current().map_err(|_| ScheduleError::NoRuntime)?;
        match &self.permits {
            None => {
                handle.spawn(task);
            }
            Some((semaphore, limit)) => {
                let permit = Arc::clone(semaphore)
                    .try_acquire_owned()
                    .map_err(|_| ScheduleError::Saturated { limit: *limit })?;
                handle.spawn(async move {
                    task.await;
                    drop(permit);
                });
            }
        }
        Ok(())
    }
}
