//! TimelineEvent - chronological drain / playback output
//!
//! All records across all streams that share one exact world timestamp.

use serde::Serialize;
use std::collections::HashMap;

use crate::{Record, SensorName};

/// Records newly elapsed per stream, as returned by playback `advance`.
/// Streams that contributed nothing are absent (not mapped to empty lists).
pub type PlaybackSlice = HashMap<SensorName, Vec<Record>>;

/// One instant on the merged timeline.
///
/// The per-sensor value is a `Vec` because a single stream may legitimately
/// contain several records with an identical timestamp; every record is
/// delivered exactly once, so none may be collapsed away. In practice the
/// vectors have length 1.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    /// World timestamp shared by every record in this event (milliseconds)
    pub timestamp_ms: f64,

    /// Records grouped by originating stream
    pub records: HashMap<SensorName, Vec<Record>>,
}

impl TimelineEvent {
    /// Event with no records yet, at the given world time.
    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            records: HashMap::new(),
        }
    }

    /// Build an event from a playback slice.
    pub fn from_slice(timestamp_ms: f64, slice: PlaybackSlice) -> Self {
        Self {
            timestamp_ms,
            records: slice,
        }
    }

    /// Append a record under its stream name.
    pub fn push(&mut self, name: SensorName, record: Record) {
        self.records.entry(name).or_default().push(record);
    }

    /// Total individual records in this event.
    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    /// Number of streams contributing to this event.
    pub fn sensor_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_groups_by_sensor() {
        let mut event = TimelineEvent::empty(10.0);
        event.push("a".into(), Record::at(10.0));
        event.push("a".into(), Record::at(10.0));
        event.push("b".into(), Record::at(10.0));

        assert_eq!(event.sensor_count(), 2);
        assert_eq!(event.record_count(), 3);
        assert_eq!(event.records.get("a").unwrap().len(), 2);
    }
}
