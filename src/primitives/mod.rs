//! Примитивы синхронизации, которые брокер умеет использовать как агентов.
//!
//! - `signal`: флаг-событие без данных (`set`/`clear`/`wait`).
//! - `queue`: ограниченная FIFO-очередь, при переполнении отказывает.
//! - `ringbuf`: кольцевой буфер, при переполнении вытесняет самый старый
//!   элемент.

pub mod queue;
pub mod ringbuf;
pub mod signal;

pub use queue::Queue;
pub use ringbuf::RingbufQueue;
pub use signal::Signal;
