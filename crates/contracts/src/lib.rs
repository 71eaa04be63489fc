//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Record timestamps are milliseconds (`f64`, may be fractional)
//! - "Native time" is the as-recorded `timestamp_ms` inside a stream
//! - "World time" is native time plus the stream's configured `time_offset_ms`

mod blueprint;
mod error;
mod event;
mod record;
mod sensor_name;
mod sink;
mod strategy;

pub use blueprint::*;
pub use error::*;
pub use event::*;
pub use record::*;
pub use sensor_name::SensorName;
pub use sink::{EventSink, LocalEventSink};
pub use strategy::MatchStrategy;
