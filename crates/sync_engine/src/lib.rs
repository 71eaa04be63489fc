//! # Sync Engine
//!
//! Time-indexed multi-sensor replay core.
//!
//! Responsibilities:
//! - Eager JSON Lines record loading (fail fast on malformed sources)
//! - Per-stream point queries under forward/backward/nearest matching
//! - Exactly-once chronological merge across all streams
//! - Stateful incremental playback against an external clock
//!
//! ## Usage example
//!
//! ```ignore
//! use contracts::{MatchStrategy, StreamConfig};
//! use sync_engine::SensorDataManager;
//!
//! let mut manager = SensorDataManager::new();
//! manager.register_sensor(&StreamConfig::new("imu", "recordings/imu.jsonl"))?;
//!
//! // Poll one stream at a world time
//! let sample = manager.get_value_at("imu", 1_250.0, MatchStrategy::Nearest);
//!
//! // Or drain every record, chronologically, exactly once
//! for event in manager.iter_events() {
//!     // handle event
//! }
//! ```
//!
//! Everything except [`SensorPlayback`] is read-only after construction and
//! can be shared freely between readers; playback cursors are exclusively
//! owned by their instance.

mod events;
mod loader;
mod manager;
mod playback;
mod stream;

pub use events::TimelineEvents;
pub use loader::load_records;
pub use manager::SensorDataManager;
pub use playback::SensorPlayback;
pub use stream::SensorStream;

// Re-export contract types
pub use contracts::{
    ContractError, MatchStrategy, PlaybackSlice, Record, SensorName, StreamConfig, TimelineEvent,
};
