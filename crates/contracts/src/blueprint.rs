//! ReplayBlueprint - Config Loader output
//!
//! Describes a full replay session: sensor stream sources, their time
//! alignment parameters, the playback mode, and the output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::{MatchStrategy, SensorName};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete replay session blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Playback driving mode
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Sensor stream definitions
    pub streams: Vec<StreamConfig>,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// How the pipeline walks the merged timeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Driving mode
    #[serde(default)]
    pub mode: ReplayMode,

    /// Frame clock period for paced mode (milliseconds), must be > 0
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: f64,

    /// Paced-mode speed multiplier (1.0 = original speed), must be > 0
    #[serde(default = "default_speed")]
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            mode: ReplayMode::default(),
            frame_interval_ms: default_frame_interval_ms(),
            speed: default_speed(),
        }
    }
}

fn default_frame_interval_ms() -> f64 {
    33.3 // ~30 fps frame clock
}

fn default_speed() -> f64 {
    1.0
}

/// Replay driving mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    /// Exactly-once chronological drain, as fast as the sinks allow
    #[default]
    Drain,
    /// Incremental playback against a real-time frame clock
    Paced,
}

/// One sensor stream source and its alignment parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Unique stream name
    pub name: SensorName,

    /// JSON Lines source path
    pub path: PathBuf,

    /// Signed offset added to native timestamps to obtain world time (ms)
    #[serde(default)]
    pub time_offset_ms: f64,

    /// Maximum |query - match| distance (ms); omitted = unbounded
    #[serde(default)]
    pub tolerance_ms: Option<f64>,

    /// Default matching policy for snapshot queries
    #[serde(default)]
    pub strategy: MatchStrategy,
}

impl StreamConfig {
    /// Minimal config: name + path, defaults everywhere else.
    pub fn new(name: impl Into<SensorName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            time_offset_ms: 0.0,
            tolerance_ms: None,
            strategy: MatchStrategy::default(),
        }
    }
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Unique sink name (used for logging/metrics)
    pub name: String,

    /// Sink kind
    pub sink_type: SinkType,

    /// Bounded queue capacity between dispatcher and sink worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Sink-specific parameters (e.g. `path`, `addr`)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log event summaries via tracing
    Log,
    /// Append events to a JSON Lines file
    Jsonl,
    /// Fire-and-forget UDP JSON datagrams
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let json = r#"{"name": "imu", "path": "rec/imu.jsonl"}"#;
        let config: StreamConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.time_offset_ms, 0.0);
        assert_eq!(config.tolerance_ms, None);
        assert_eq!(config.strategy, MatchStrategy::Forward);
    }

    #[test]
    fn test_playback_defaults() {
        let config = PlaybackConfig::default();
        assert_eq!(config.mode, ReplayMode::Drain);
        assert!(config.frame_interval_ms > 0.0);
        assert_eq!(config.speed, 1.0);
    }
}
