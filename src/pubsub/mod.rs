//! Подсистема Publish–Subscribe (pub/sub).
//!
//! Внутрипроцессный брокер, который доставляет события по топикам агентам
//! пяти видов:
//!
//! - `agent`: виды агентов и их классификация при подписке.
//! - `broker`: публичный API `subscribe` / `unsubscribe` / `publish`.
//! - `diagnostics`: некритичные предупреждения, управляемые флагом Verbose.
//! - `invoker` (приватный): доставка одной записи в зависимости от вида
//!   агента.
//! - `message`: нагрузка, сообщение и доставка с аргументами.
//! - `metrics`: счётчики публикаций и сбоев.
//! - `scheduler`: запуск асинхронных обработчиков.
//! - `table`: реестр подписок.
//! - `topic`: ключи топиков и сопоставление с шаблонами.

pub mod agent;
pub mod broker;
pub mod diagnostics;
mod invoker;
pub mod message;
pub mod metrics;
pub mod scheduler;
pub mod table;
pub mod topic;

pub use agent::*;
pub use broker::*;
pub use diagnostics::*;
pub use message::*;
pub use metrics::*;
pub use scheduler::*;
pub use table::{Registration, SubscriptionId, SubscriptionTable};
pub use topic::*;
