//! Replay metric collection.
//!
//! Hot-path recording via the `metrics` facade, plus an in-memory
//! aggregator for the end-of-run summary printed by the CLI.

use std::collections::HashMap;

use contracts::TimelineEvent;
use metrics::{counter, gauge, histogram};

/// Record one emitted timeline event.
///
/// Called for every event the pipeline produces, in both drain and paced
/// modes.
pub fn record_event_emitted(event: &TimelineEvent) {
    counter!("replay_events_total").increment(1);
    counter!("replay_records_total").increment(event.record_count() as u64);

    gauge!("replay_last_event_timestamp_ms").set(event.timestamp_ms);
    histogram!("replay_records_per_event").record(event.record_count() as f64);

    for (name, list) in &event.records {
        counter!("replay_sensor_records_total", "sensor" => name.to_string())
            .increment(list.len() as u64);
    }
}

/// Record a stream registration at load time.
pub fn record_stream_loaded(sensor: &str, records: usize) {
    gauge!("replay_stream_records", "sensor" => sensor.to_string()).set(records as f64);
}

/// Record an event handed to a sink.
pub fn record_event_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "replay_events_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a snapshot query that found nothing inside the tolerance window.
pub fn record_snapshot_miss(sensor: &str) {
    counter!("replay_snapshot_misses_total", "sensor" => sensor.to_string()).increment(1);
}

/// Record a playback clock regression observed by the pipeline driver.
pub fn record_clock_regression() {
    counter!("replay_clock_regressions_total").increment(1);
}

/// Replay metrics aggregator
///
/// Aggregates in memory for statistics and summary output.
#[derive(Debug, Clone, Default)]
pub struct ReplayMetricsAggregator {
    /// Total emitted events
    pub total_events: u64,

    /// Total emitted records
    pub total_records: u64,

    /// Records per sensor
    pub sensor_records: HashMap<String, u64>,

    /// Records-per-event statistics
    pub density_stats: RunningStats,

    /// Gap between consecutive event timestamps (ms)
    pub gap_stats: RunningStats,

    /// Last event timestamp, for gap computation
    last_timestamp_ms: Option<f64>,
}

impl ReplayMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Update aggregate statistics from one event
    pub fn update(&mut self, event: &TimelineEvent) {
        self.total_events += 1;
        let records = event.record_count() as u64;
        self.total_records += records;
        self.density_stats.push(records as f64);

        if let Some(last) = self.last_timestamp_ms {
            self.gap_stats.push(event.timestamp_ms - last);
        }
        self.last_timestamp_ms = Some(event.timestamp_ms);

        for (name, list) in &event.records {
            *self.sensor_records.entry(name.to_string()).or_insert(0) += list.len() as u64;
        }
    }

    /// Produce the summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_events: self.total_events,
            total_records: self.total_records,
            records_per_event: StatsSummary::from(&self.density_stats),
            event_gap_ms: StatsSummary::from(&self.gap_stats),
            sensor_records: self.sensor_records.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_events: u64,
    pub total_records: u64,
    pub records_per_event: StatsSummary,
    pub event_gap_ms: StatsSummary,
    pub sensor_records: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Replay Metrics Summary ===")?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(f, "Total records: {}", self.total_records)?;
        writeln!(f, "Records per event: {}", self.records_per_event)?;
        writeln!(f, "Event gap (ms): {}", self.event_gap_ms)?;

        if !self.sensor_records.is_empty() {
            writeln!(f, "Records per sensor:")?;
            let mut sensors: Vec<_> = self.sensor_records.iter().collect();
            sensors.sort_by_key(|(name, _)| name.as_str());
            for (sensor, count) in sensors {
                writeln!(f, "  {sensor}: {count}")?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.max
        }
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Record;

    fn event_with(timestamp_ms: f64, sensors: &[(&str, usize)]) -> TimelineEvent {
        let mut event = TimelineEvent::empty(timestamp_ms);
        for (name, count) in sensors {
            for _ in 0..*count {
                event.push((*name).into(), Record::at(timestamp_ms));
            }
        }
        event
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(value);
        }
        assert_eq!(stats.count(), 8);
        assert_eq!(stats.min(), 2.0);
        assert_eq!(stats.max(), 9.0);
        assert!((stats.mean() - 5.0).abs() < 1e-9);
        // Sample std dev of this classic sequence is ~2.138
        assert!((stats.std_dev() - 2.138).abs() < 0.01);
    }

    #[test]
    fn test_aggregator_counts_events_and_gaps() {
        let mut agg = ReplayMetricsAggregator::new();
        agg.update(&event_with(0.0, &[("imu", 1)]));
        agg.update(&event_with(10.0, &[("imu", 1), ("gps", 2)]));
        agg.update(&event_with(30.0, &[("gps", 1)]));

        let summary = agg.summary();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.sensor_records["imu"], 2);
        assert_eq!(summary.sensor_records["gps"], 3);
        // Gaps: 10, 20
        assert_eq!(summary.event_gap_ms.count, 2);
        assert_eq!(summary.event_gap_ms.min, 10.0);
        assert_eq!(summary.event_gap_ms.max, 20.0);
    }

    #[test]
    fn test_empty_summary_displays() {
        let summary = ReplayMetricsAggregator::new().summary();
        let text = format!("{summary}");
        assert!(text.contains("Total events: 0"));
        assert!(text.contains("N/A"));
    }
}
