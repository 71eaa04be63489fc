//! SensorDataManager - named collection of sensor streams.
//!
//! Built incrementally via registration, then used read-only. All aggregate
//! queries label results by sensor name, so map iteration order never leaks
//! into semantics.

use std::collections::HashMap;

use contracts::{ContractError, MatchStrategy, Record, SensorName, StreamConfig};
use tracing::debug;

use crate::events::TimelineEvents;
use crate::stream::SensorStream;

/// Owns all registered streams and answers aggregate time queries.
#[derive(Debug, Default)]
pub struct SensorDataManager {
    streams: HashMap<SensorName, SensorStream>,
}

impl SensorDataManager {
    /// Empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register every stream of a blueprint.
    ///
    /// # Errors
    /// First duplicate name or stream load failure; no partial state escapes.
    pub fn from_configs(configs: &[StreamConfig]) -> Result<Self, ContractError> {
        let mut manager = Self::new();
        for config in configs {
            manager.register_sensor(config)?;
        }
        Ok(manager)
    }

    /// Load a stream from disk and register it under its configured name.
    ///
    /// # Errors
    /// - name already registered
    /// - source unreadable or malformed
    pub fn register_sensor(&mut self, config: &StreamConfig) -> Result<(), ContractError> {
        if self.streams.contains_key(config.name.as_str()) {
            return Err(ContractError::duplicate_sensor(config.name.as_str()));
        }

        let stream = SensorStream::load(config)?;
        metrics::gauge!(
            "replay_stream_records",
            "sensor" => config.name.to_string()
        )
        .set(stream.len() as f64);

        debug!(
            sensor = %config.name,
            records = stream.len(),
            offset_ms = config.time_offset_ms,
            "Registered sensor stream"
        );

        self.streams.insert(config.name.clone(), stream);
        Ok(())
    }

    /// Register an already-built stream (in-memory sources, tests).
    ///
    /// # Errors
    /// Name already registered.
    pub fn insert_stream(
        &mut self,
        name: impl Into<SensorName>,
        stream: SensorStream,
    ) -> Result<(), ContractError> {
        let name = name.into();
        if self.streams.contains_key(name.as_str()) {
            return Err(ContractError::duplicate_sensor(name.as_str()));
        }
        self.streams.insert(name, stream);
        Ok(())
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no streams are registered.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Total records across all streams.
    pub fn total_records(&self) -> usize {
        self.streams.values().map(SensorStream::len).sum()
    }

    /// Registered sensor names.
    pub fn sensor_names(&self) -> Vec<SensorName> {
        self.streams.keys().cloned().collect()
    }

    /// Look up one stream.
    pub fn stream(&self, name: &str) -> Option<&SensorStream> {
        self.streams.get(name)
    }

    /// Point query against one stream.
    ///
    /// `None` for unknown sensors and for in-stream no-match conditions alike;
    /// neither is an error at query time.
    pub fn get_value_at(
        &self,
        name: &str,
        snapshot_time_ms: f64,
        strategy: MatchStrategy,
    ) -> Option<Record> {
        self.streams.get(name)?.value_at(snapshot_time_ms, strategy)
    }

    /// Snapshot of every registered sensor at a world time.
    ///
    /// Every registered name is present in the result; sensors with nothing
    /// inside their tolerance window map to `None`. Each stream is queried
    /// with its own configured default strategy.
    pub fn get_all_sensors_at(&self, snapshot_time_ms: f64) -> HashMap<SensorName, Option<Record>> {
        self.streams
            .iter()
            .map(|(name, stream)| (name.clone(), stream.value_at_default(snapshot_time_ms)))
            .collect()
    }

    /// Native-time range of one stream, or the union range of all streams.
    ///
    /// Deliberately reports NATIVE timestamps: per-stream offsets are not
    /// applied. Callers that need world-time bounds (the paced replay driver
    /// does) must use [`world_time_range`](Self::world_time_range) instead.
    pub fn get_time_range(&self, sensor: Option<&str>) -> Option<(f64, f64)> {
        match sensor {
            Some(name) => {
                let stream = self.streams.get(name)?;
                Some((stream.min_timestamp()?, stream.max_timestamp()?))
            }
            None => self.union_range(|stream| (stream.min_timestamp(), stream.max_timestamp())),
        }
    }

    /// Union world-time range (offsets applied) across all streams.
    pub fn world_time_range(&self) -> Option<(f64, f64)> {
        self.union_range(|stream| {
            (
                stream.min_timestamp().map(|t| t + stream.time_offset_ms()),
                stream.max_timestamp().map(|t| t + stream.time_offset_ms()),
            )
        })
    }

    fn union_range(
        &self,
        bounds: impl Fn(&SensorStream) -> (Option<f64>, Option<f64>),
    ) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for stream in self.streams.values() {
            let (Some(min), Some(max)) = bounds(stream) else {
                continue;
            };
            range = Some(match range {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
        }
        range
    }

    /// Fresh, independent chronological traversal over all streams.
    ///
    /// Each call starts over; a single iterator instance is single-pass.
    pub fn iter_events(&self) -> TimelineEvents<'_> {
        TimelineEvents::new(&self.streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with(times: &[f64], offset: f64) -> SensorStream {
        let records = times.iter().map(|&t| Record::at(t)).collect();
        let mut config = StreamConfig::new("mem", "mem.jsonl");
        config.time_offset_ms = offset;
        SensorStream::from_records(records, &config)
    }

    fn two_sensor_manager() -> SensorDataManager {
        let mut manager = SensorDataManager::new();
        manager
            .insert_stream("imu", stream_with(&[0.0, 100.0, 200.0], 0.0))
            .unwrap();
        manager
            .insert_stream("gps", stream_with(&[50.0, 150.0], 25.0))
            .unwrap();
        manager
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut manager = SensorDataManager::new();
        manager.insert_stream("imu", stream_with(&[0.0], 0.0)).unwrap();
        let err = manager
            .insert_stream("imu", stream_with(&[1.0], 0.0))
            .unwrap_err();
        assert!(matches!(err, ContractError::DuplicateSensor { .. }));
        // First registration survives
        assert_eq!(manager.stream("imu").unwrap().len(), 1);
    }

    #[test]
    fn test_register_sensor_missing_source() {
        let mut manager = SensorDataManager::new();
        let err = manager
            .register_sensor(&StreamConfig::new("ghost", "/nonexistent.jsonl"))
            .unwrap_err();
        assert!(matches!(err, ContractError::SourceRead { .. }));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_snapshot_never_omits_sensors() {
        let manager = two_sensor_manager();

        // Before every stream starts: both present, both unmatched.
        let snapshot = manager.get_all_sensors_at(-10.0);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get("imu").unwrap().is_none());
        assert!(snapshot.get("gps").unwrap().is_none());

        let snapshot = manager.get_all_sensors_at(120.0);
        assert_eq!(
            snapshot.get("imu").unwrap().as_ref().unwrap().timestamp_ms(),
            100.0
        );
        // gps offset 25 -> aligned 95 -> forward match native 50.
        assert_eq!(
            snapshot.get("gps").unwrap().as_ref().unwrap().timestamp_ms(),
            50.0
        );
    }

    #[test]
    fn test_time_range_is_native() {
        let manager = two_sensor_manager();
        // gps has offset 25 but the range ignores it.
        assert_eq!(manager.get_time_range(Some("gps")), Some((50.0, 150.0)));
        assert_eq!(manager.get_time_range(None), Some((0.0, 200.0)));
        assert_eq!(manager.get_time_range(Some("unknown")), None);
    }

    #[test]
    fn test_world_time_range_applies_offsets() {
        let manager = two_sensor_manager();
        assert_eq!(manager.world_time_range(), Some((0.0, 200.0)));

        let mut shifted = SensorDataManager::new();
        shifted
            .insert_stream("late", stream_with(&[100.0, 200.0], 500.0))
            .unwrap();
        assert_eq!(shifted.world_time_range(), Some((600.0, 700.0)));
        assert_eq!(shifted.get_time_range(None), Some((100.0, 200.0)));
    }

    #[test]
    fn test_empty_streams_excluded_from_union_range() {
        let mut manager = SensorDataManager::new();
        manager.insert_stream("void", stream_with(&[], 0.0)).unwrap();
        assert_eq!(manager.get_time_range(None), None);
        assert_eq!(manager.get_time_range(Some("void")), None);

        manager
            .insert_stream("imu", stream_with(&[5.0], 0.0))
            .unwrap();
        assert_eq!(manager.get_time_range(None), Some((5.0, 5.0)));
    }

    #[test]
    fn test_point_query_unknown_sensor() {
        let manager = two_sensor_manager();
        assert!(manager
            .get_value_at("unknown", 100.0, MatchStrategy::Forward)
            .is_none());
    }
}
