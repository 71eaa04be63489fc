//! # Dispatcher
//!
//! Event fan-out module.
//!
//! Responsibilities:
//! - Consume `TimelineEvent`s
//! - Fan-out to multiple sinks
//! - Isolate slow sinks from the main path

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use contracts::{EventSink, TimelineEvent};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{JsonlSink, LogSink, NetworkSink};
