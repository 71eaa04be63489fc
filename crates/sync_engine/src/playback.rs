//! SensorPlayback - stateful incremental playback cursor.
//!
//! The only mutable object in the engine. Given an externally driven clock,
//! each `advance` call returns exactly the records whose world time falls in
//! `(previous_time, current_time]`, per stream, never revisiting a record.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{PlaybackSlice, SensorName};
use tracing::{trace, warn};

use crate::manager::SensorDataManager;

/// Incremental consumer over a shared read-only manager.
///
/// Cursor state is exclusively owned by this instance; independent consumers
/// each construct their own playback over the same `Arc`'d manager.
#[derive(Debug)]
pub struct SensorPlayback {
    manager: Arc<SensorDataManager>,
    // Next unconsumed index per stream; monotone, never rewound.
    cursors: HashMap<SensorName, usize>,
    last_time_ms: f64,
}

impl SensorPlayback {
    /// New playback positioned before the first record of every stream.
    pub fn new(manager: Arc<SensorDataManager>) -> Self {
        let cursors = manager
            .sensor_names()
            .into_iter()
            .map(|name| (name, 0))
            .collect();
        Self {
            manager,
            cursors,
            last_time_ms: f64::NEG_INFINITY,
        }
    }

    /// Clock value of the previous `advance` call (−∞ before the first).
    pub fn last_time_ms(&self) -> f64 {
        self.last_time_ms
    }

    /// Next unconsumed index for one stream.
    pub fn cursor(&self, name: &str) -> Option<usize> {
        self.cursors.get(name).copied()
    }

    /// Whether every stream has been fully delivered.
    pub fn is_exhausted(&self) -> bool {
        self.cursors.iter().all(|(name, &cursor)| {
            self.manager
                .stream(name)
                .map_or(true, |stream| cursor >= stream.len())
        })
    }

    /// Deliver the records newly elapsed since the previous call.
    ///
    /// A record at native time `t` in a stream with offset `o` is included
    /// iff `last < t + o <= current`. Streams contributing nothing are absent
    /// from the result.
    ///
    /// A clock running backwards is treated as a soft condition, not an
    /// error: the call warns, counts, returns an empty slice, and leaves all
    /// state untouched, so a jittery external driver keeps making progress.
    pub fn advance(&mut self, current_time_ms: f64) -> PlaybackSlice {
        if current_time_ms < self.last_time_ms {
            warn!(
                current_time_ms,
                last_time_ms = self.last_time_ms,
                "Playback clock moved backwards; returning empty slice"
            );
            metrics::counter!("replay_clock_regressions_total").increment(1);
            return PlaybackSlice::new();
        }

        let mut slice = PlaybackSlice::new();
        for (name, cursor) in &mut self.cursors {
            let Some(stream) = self.manager.stream(name) else {
                continue;
            };

            let mut fresh = Vec::new();
            while let Some(world_ts) = stream.world_timestamp_at(*cursor) {
                if world_ts > current_time_ms {
                    break;
                }
                if let Some(record) = stream.record(*cursor) {
                    fresh.push(record.clone());
                }
                *cursor += 1;
            }

            if !fresh.is_empty() {
                trace!(sensor = %name, records = fresh.len(), "Playback slice");
                slice.insert(name.clone(), fresh);
            }
        }

        self.last_time_ms = current_time_ms;
        slice
    }
}
