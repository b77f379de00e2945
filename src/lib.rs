/// Settings loaded from the environment.
pub mod config;
/// Logging setup (filters, console formats).
pub mod logging;
/// Signal, bounded queue and ring buffer used as subscribers.
pub mod primitives;
/// Pub/Sub: Broker, agents, topic keys.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use config::Settings;
/// Logging entry point.
pub use logging::{init_logging, LogFormat, LoggingConfig};
/// Subscriber primitives.
pub use primitives::{Queue, RingbufQueue, Signal};
/// Pub/Sub API.
pub use pubsub::{
    Agent, AgentKind, AnyAgent, Arg, AsyncHandler, Broker, Delivery, Diagnostics, HandlerResult,
    IntoAgent, Message, MetricsSnapshot, Payload, Schedule, SubscriptionId, SyncHandler,
    TokioScheduler, TopicKey, TopicPattern,
};
/// Error and warning types.
pub use tidings_error::{
    DeliveryError, ErrorExt, HandlerError, QueueError, ScheduleError, StatusCode, SubscribeError,
    UnsubscribeWarning,
};
