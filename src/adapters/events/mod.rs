//! Event publishing adapters.
//!
//! - `InMemoryEventBus` - Captures envelopes in process for tests and local runs
//! - `LoggingEventPublisher` - Emits each envelope as a structured tracing record

mod in_memory;
mod logging;

pub use in_memory::InMemoryEventBus;
pub use logging::LoggingEventPublisher;
