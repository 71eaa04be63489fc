//! SensorStream - one immutable, timestamp-sorted record sequence.
//!
//! Loaded once, sorted once, then answers point queries by binary search
//! over a parallel timestamp array.

use std::path::{Path, PathBuf};

use contracts::{ContractError, MatchStrategy, Record, StreamConfig};

use crate::loader;

/// One sensor stream: sorted records plus alignment parameters.
///
/// Queries arrive in world time; `time_offset_ms` translates them back into
/// the stream's native time base. Ties in the input keep their original
/// relative order (stable sort), which makes replays of sources with
/// repeated timestamps reproducible.
#[derive(Debug, Clone)]
pub struct SensorStream {
    data_path: PathBuf,
    time_offset_ms: f64,
    tolerance_ms: f64,
    default_strategy: MatchStrategy,
    records: Vec<Record>,
    // Native timestamps, ascending, parallel to `records`.
    timestamps: Vec<f64>,
}

impl SensorStream {
    /// Load a stream from its configured JSON Lines source.
    ///
    /// # Errors
    /// Source unreadable, malformed line, or missing/non-finite timestamp.
    pub fn load(config: &StreamConfig) -> Result<Self, ContractError> {
        let records = loader::load_records(&config.path)?;
        Ok(Self::from_records(records, config))
    }

    /// Build a stream from already-loaded records (in-memory sources, tests).
    pub fn from_records(mut records: Vec<Record>, config: &StreamConfig) -> Self {
        records.sort_by(|a, b| a.timestamp_ms().total_cmp(&b.timestamp_ms()));
        let timestamps = records.iter().map(Record::timestamp_ms).collect();

        Self {
            data_path: config.path.clone(),
            time_offset_ms: config.time_offset_ms,
            tolerance_ms: config.tolerance_ms.unwrap_or(f64::INFINITY),
            default_strategy: config.strategy,
            records,
            timestamps,
        }
    }

    /// Source path this stream was loaded from.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Signed native-to-world offset in milliseconds.
    pub fn time_offset_ms(&self) -> f64 {
        self.time_offset_ms
    }

    /// Maximum acceptable |query - match| distance in milliseconds.
    pub fn tolerance_ms(&self) -> f64 {
        self.tolerance_ms
    }

    /// Matching policy used by snapshot queries.
    pub fn default_strategy(&self) -> MatchStrategy {
        self.default_strategy
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the stream holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest native timestamp, if any.
    pub fn min_timestamp(&self) -> Option<f64> {
        self.timestamps.first().copied()
    }

    /// Latest native timestamp, if any.
    pub fn max_timestamp(&self) -> Option<f64> {
        self.timestamps.last().copied()
    }

    /// All records, ascending by native timestamp.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record at a sorted position.
    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Native timestamp at a sorted position.
    pub fn timestamp_at(&self, index: usize) -> Option<f64> {
        self.timestamps.get(index).copied()
    }

    /// World timestamp (native + offset) at a sorted position.
    pub fn world_timestamp_at(&self, index: usize) -> Option<f64> {
        self.timestamp_at(index).map(|t| t + self.time_offset_ms)
    }

    /// Resolve the stream's state at a world time under the given policy.
    ///
    /// Returns a copy of the matched record stamped with `snapshot_time_ms`
    /// (the query) and `aligned_time_ms` (the query in native time), or
    /// `None` when nothing falls inside the tolerance window.
    pub fn value_at(&self, snapshot_time_ms: f64, strategy: MatchStrategy) -> Option<Record> {
        let aligned_time_ms = snapshot_time_ms - self.time_offset_ms;

        let index = match strategy {
            MatchStrategy::Forward => self.find_forward(aligned_time_ms),
            MatchStrategy::Backward => self.find_backward(aligned_time_ms),
            MatchStrategy::Nearest => self.find_nearest(aligned_time_ms),
        }?;

        if (self.timestamps[index] - aligned_time_ms).abs() > self.tolerance_ms {
            return None;
        }

        Some(self.records[index].stamped(snapshot_time_ms, aligned_time_ms))
    }

    /// [`value_at`](Self::value_at) with the stream's configured policy.
    pub fn value_at_default(&self, snapshot_time_ms: f64) -> Option<Record> {
        self.value_at(snapshot_time_ms, self.default_strategy)
    }

    /// Latest record with native timestamp <= aligned; last of an equal run.
    fn find_forward(&self, aligned: f64) -> Option<usize> {
        self.timestamps
            .partition_point(|&t| t <= aligned)
            .checked_sub(1)
    }

    /// Earliest record with native timestamp >= aligned; first of an equal run.
    fn find_backward(&self, aligned: f64) -> Option<usize> {
        let p = self.timestamps.partition_point(|&t| t < aligned);
        (p < self.timestamps.len()).then_some(p)
    }

    /// Record minimizing |timestamp - aligned|; exact ties go to the later index.
    fn find_nearest(&self, aligned: f64) -> Option<usize> {
        if self.timestamps.is_empty() {
            return None;
        }
        let p = self.timestamps.partition_point(|&t| t < aligned);
        if p == 0 {
            return Some(0);
        }
        if p == self.timestamps.len() {
            return Some(p - 1);
        }

        let before = self.timestamps[p - 1];
        let after = self.timestamps[p];
        if (aligned - before) < (after - aligned) {
            Some(p - 1)
        } else {
            Some(p)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ALIGNED_TIME_FIELD, SNAPSHOT_TIME_FIELD};
    use serde_json::json;

    fn stream_at(times: &[f64], offset: f64, tolerance: Option<f64>) -> SensorStream {
        let records = times.iter().map(|&t| Record::at(t)).collect();
        let mut config = StreamConfig::new("test", "test.jsonl");
        config.time_offset_ms = offset;
        config.tolerance_ms = tolerance;
        SensorStream::from_records(records, &config)
    }

    #[test]
    fn test_records_sorted_after_construction() {
        let stream = stream_at(&[300.0, 100.0, 200.0], 0.0, None);
        let times: Vec<f64> = stream.records().iter().map(Record::timestamp_ms).collect();
        assert_eq!(times, vec![100.0, 200.0, 300.0]);
        assert_eq!(stream.min_timestamp(), Some(100.0));
        assert_eq!(stream.max_timestamp(), Some(300.0));
    }

    #[test]
    fn test_stable_sort_keeps_tie_order() {
        let records = vec![
            Record::at(100.0).with_field("seq", json!(0)),
            Record::at(100.0).with_field("seq", json!(1)),
            Record::at(50.0).with_field("seq", json!(2)),
        ];
        let stream = SensorStream::from_records(records, &StreamConfig::new("t", "t.jsonl"));
        assert_eq!(stream.record(1).unwrap().get("seq"), Some(&json!(0)));
        assert_eq!(stream.record(2).unwrap().get("seq"), Some(&json!(1)));
    }

    #[test]
    fn test_forward_holds_last_value() {
        let stream = stream_at(&[100.0, 200.0, 300.0], 50.0, None);

        // World 170 -> aligned 120 -> last record <= 120 is t=100.
        let hit = stream.value_at(170.0, MatchStrategy::Forward).unwrap();
        assert_eq!(hit.timestamp_ms(), 100.0);
        assert_eq!(hit.get(SNAPSHOT_TIME_FIELD), Some(&json!(170.0)));
        assert_eq!(hit.get(ALIGNED_TIME_FIELD), Some(&json!(120.0)));

        // World 140 -> aligned 90 -> nothing at or before 90.
        assert!(stream.value_at(140.0, MatchStrategy::Forward).is_none());
    }

    #[test]
    fn test_backward_looks_ahead() {
        let stream = stream_at(&[0.0, 100.0, 200.0], 0.0, None);
        let hit = stream.value_at(150.0, MatchStrategy::Backward).unwrap();
        assert_eq!(hit.timestamp_ms(), 200.0);

        // Exact hit matches itself.
        let hit = stream.value_at(100.0, MatchStrategy::Backward).unwrap();
        assert_eq!(hit.timestamp_ms(), 100.0);

        // After the last record there is nothing to look ahead to.
        assert!(stream.value_at(201.0, MatchStrategy::Backward).is_none());
    }

    #[test]
    fn test_nearest_picks_closest() {
        let stream = stream_at(&[0.0, 100.0, 200.0], 0.0, None);
        assert_eq!(
            stream
                .value_at(140.0, MatchStrategy::Nearest)
                .unwrap()
                .timestamp_ms(),
            100.0
        );
        assert_eq!(
            stream
                .value_at(160.0, MatchStrategy::Nearest)
                .unwrap()
                .timestamp_ms(),
            200.0
        );
        // Out-of-range queries clamp to the boundary records.
        assert_eq!(
            stream
                .value_at(-50.0, MatchStrategy::Nearest)
                .unwrap()
                .timestamp_ms(),
            0.0
        );
        assert_eq!(
            stream
                .value_at(999.0, MatchStrategy::Nearest)
                .unwrap()
                .timestamp_ms(),
            200.0
        );
    }

    #[test]
    fn test_nearest_exact_tie_prefers_later() {
        let stream = stream_at(&[100.0, 200.0], 0.0, None);
        let hit = stream.value_at(150.0, MatchStrategy::Nearest).unwrap();
        assert_eq!(hit.timestamp_ms(), 200.0);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let stream = stream_at(&[0.0], 0.0, Some(100.0));
        assert!(stream.value_at(100.0, MatchStrategy::Forward).is_some());
        assert!(stream.value_at(100.001, MatchStrategy::Forward).is_none());
    }

    #[test]
    fn test_offset_translation() {
        // Native t with offset O must match a forward query at world t + O.
        let stream = stream_at(&[1000.0], 250.0, Some(0.0));
        assert!(stream.value_at(1250.0, MatchStrategy::Forward).is_some());
        assert!(stream.value_at(1249.0, MatchStrategy::Forward).is_none());
    }

    #[test]
    fn test_queries_do_not_mutate() {
        let stream = stream_at(&[0.0, 100.0], 0.0, None);
        let first = stream.value_at(60.0, MatchStrategy::Nearest);
        let second = stream.value_at(60.0, MatchStrategy::Nearest);
        assert_eq!(first, second);
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_empty_stream_never_matches() {
        let stream = stream_at(&[], 0.0, None);
        assert!(stream.value_at(0.0, MatchStrategy::Forward).is_none());
        assert!(stream.value_at(0.0, MatchStrategy::Backward).is_none());
        assert!(stream.value_at(0.0, MatchStrategy::Nearest).is_none());
        assert_eq!(stream.min_timestamp(), None);
    }
}
