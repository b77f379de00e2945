//! Доставка одной записи подписки в зависимости от вида агента.
//!
//! | Агент         | Действие                             | При сбое                             |
//! |---------------|--------------------------------------|--------------------------------------|
//! | sync-handler  | вызов `(topic, payload, args)`       | ошибка/паника → `HandlerFailed`      |
//! | async-handler | `schedule(handler(delivery))`        | паника → `HandlerFailed`, отказ → `Schedule` |
//! | signal        | `set()`                              | не бывает                            |
//! | queue         | `try_put((topic, payload))`          | переполнение → `QueueFull`           |
//! | ring-queue    | `put_nowait((topic, payload, args))` | вытеснение → `RingOverwrite`         |
//!
//! Запись подписки при сбое не удаляется.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use super::{Agent, Delivery, Message, Payload, Registration, Schedule};
use crate::DeliveryError;

/// Выполняет доставку. `Err(RingOverwrite)` означает, что сообщение
/// доставлено, но вытеснило самое старое.
pub(crate) fn dispatch(
    registration: &Registration,
    topic: &Arc<str>,
    payload: &Payload,
    scheduler: &dyn Schedule,
) -> Result<(), DeliveryError> {
    match &registration.agent {
        Agent::Sync(handler) => {
            let delivery = delivery(registration, topic, payload);
            match panic::catch_unwind(AssertUnwindSafe(|| handler.call(&delivery))) {
                Ok(res) => res.map_err(DeliveryError::from),
                Err(panic_err) => Err(DeliveryError::HandlerPanicked(panic_message(
                    &*panic_err,
                ))),
            }
        }
        Agent::Async(handler) => {
            // Замыкание, создающее future, выполняется синхронно внутри publish.
            let delivery = delivery(registration, topic, payload);
            match panic::catch_unwind(AssertUnwindSafe(|| handler.call(delivery))) {
                Ok(task) => scheduler.schedule(task).map_err(DeliveryError::from),
                Err(panic_err) => Err(DeliveryError::HandlerPanicked(panic_message(
                    &*panic_err,
                ))),
            }
        }
        Agent::Signal(signal) => {
            signal.set();
            Ok(())
        }
        Agent::Queue(queue) => queue
            .try_put(Message {
                topic: Arc::clone(topic),
                payload: payload.clone(),
            })
            .map_err(|_| DeliveryError::QueueFull),
        Agent::Ring(ring) => match ring.put_nowait(delivery(registration, topic, payload)) {
            Some(_) => Err(DeliveryError::RingOverwrite),
            None => Ok(()),
        },
    }
}

fn delivery(
    registration: &Registration,
    topic: &Arc<str>,
    payload: &Payload,
) -> Delivery {
    Delivery {
        topic: Arc::clone(topic),
        payload: payload.clone(),
        args: Arc::clone(&registration.args),
    }
}

fn panic_message(panic_err: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic_err.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::{
        primitives::{Queue, RingbufQueue, Signal},
        pubsub::SubscriptionId,
        AsyncHandler, HandlerError, ScheduleError, SyncHandler, TokioScheduler,
    };

    /// Планировщик, который только запоминает задачи.
    #[derive(Default)]
    struct Recorder(Mutex<Vec<BoxFuture<'static, ()>>>);

    impl Schedule for Recorder {
        fn schedule(
            &self,
            task: BoxFuture<'static, ()>,
        ) -> Result<(), ScheduleError> {
            self.0.lock().push(task);
            Ok(())
        }
    }

    fn reg(agent: Agent) -> Registration {
        Registration {
            id: SubscriptionId(0),
            agent,
            args: Arc::from(vec![json!("args"), json!("added")]),
        }
    }

    fn topic() -> Arc<str> {
        Arc::from("bar_topic")
    }

    /// Тест проверяет, что синхронный обработчик получает топик, нагрузку и
    /// аргументы.
    #[test]
    fn test_sync_receives_args() {
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        let h = SyncHandler::new(move |d: &Delivery| {
            *s.lock() = Some(d.clone());
            Ok(())
        });
        let r = reg(Agent::Sync(h));
        dispatch(&r, &topic(), &"rats 0".into(), &Recorder::default()).unwrap();

        let d = seen.lock().clone().unwrap();
        assert_eq!(&*d.topic, "bar_topic");
        assert_eq!(d.payload.as_str(), Some("rats 0"));
        assert_eq!(&*d.args, &[json!("args"), json!("added")]);
    }

    /// Тест проверяет, что ошибка и паника обработчика превращаются в
    /// `DeliveryError`.
    #[test]
    fn test_sync_failure_and_panic_are_contained() {
        let failing = SyncHandler::new(|_d: &Delivery| Err(HandlerError::new("nope")));
        let err = dispatch(
            &reg(Agent::Sync(failing)),
            &topic(),
            &"x".into(),
            &Recorder::default(),
        )
        .unwrap_err();
        assert_eq!(err, DeliveryError::HandlerFailed(HandlerError::new("nope")));

        let panicking = SyncHandler::new(|_d: &Delivery| panic!("boom"));
        let err = dispatch(
            &reg(Agent::Sync(panicking)),
            &topic(),
            &"x".into(),
            &Recorder::default(),
        )
        .unwrap_err();
        assert_eq!(err, DeliveryError::HandlerPanicked("boom".to_string()));
    }

    /// Тест проверяет, что асинхронный обработчик только планируется.
    #[tokio::test]
    async fn test_async_is_scheduled_not_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let h = AsyncHandler::new(move |_d: Delivery| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        let recorder = Recorder::default();
        dispatch(&reg(Agent::Async(h)), &topic(), &"x".into(), &recorder).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let tasks = std::mem::take(&mut *recorder.0.lock());
        assert_eq!(tasks.len(), 1);
        for t in tasks {
            t.await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Тест проверяет, что паника при создании future асинхронного
    /// обработчика перехватывается и ничего не планируется.
    #[test]
    fn test_async_panic_on_call_is_contained() {
        let h = AsyncHandler::new(|d: Delivery| {
            if d.payload.as_str() == Some("boom") {
                panic!("boom");
            }
            async {}
        });
        let recorder = Recorder::default();
        let err = dispatch(&reg(Agent::Async(h)), &topic(), &"boom".into(), &recorder)
            .unwrap_err();
        assert_eq!(err, DeliveryError::HandlerPanicked("boom".to_string()));
        assert!(recorder.0.lock().is_empty());
    }

    /// Тест проверяет отказ планировщика вне рантайма.
    #[test]
    fn test_async_without_runtime() {
        let h = AsyncHandler::new(|_d: Delivery| async {});
        let err = dispatch(
            &reg(Agent::Async(h)),
            &topic(),
            &"x".into(),
            &TokioScheduler::new(),
        )
        .unwrap_err();
        assert_eq!(err, DeliveryError::Schedule(ScheduleError::NoRuntime));
    }

    /// Тест проверяет поведение очереди, кольцевого буфера и сигнала.
    #[test]
    fn test_buffers_and_signal() {
        let sched = Recorder::default();

        let q = Arc::new(Queue::new(1));
        let r = reg(Agent::Queue(Arc::clone(&q)));
        dispatch(&r, &topic(), &"first".into(), &sched).unwrap();
        assert_eq!(
            dispatch(&r, &topic(), &"second".into(), &sched),
            Err(DeliveryError::QueueFull)
        );
        assert_eq!(q.get_nowait().unwrap().payload.as_str(), Some("first"));

        let rq = Arc::new(RingbufQueue::new(1));
        let r = reg(Agent::Ring(Arc::clone(&rq)));
        dispatch(&r, &topic(), &"first".into(), &sched).unwrap();
        assert_eq!(
            dispatch(&r, &topic(), &"second".into(), &sched),
            Err(DeliveryError::RingOverwrite)
        );
        let d = rq.get_nowait().unwrap();
        assert_eq!(d.payload.as_str(), Some("second"));
        assert_eq!(d.arg(0), Some(&json!("args")));

        let s = Arc::new(Signal::new());
        dispatch(&reg(Agent::Signal(Arc::clone(&s))), &topic(), &"x".into(), &sched).unwrap();
        assert!(s.is_set());
    }
}
