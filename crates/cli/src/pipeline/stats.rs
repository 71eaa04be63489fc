//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::ReplayMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total events emitted onto the dispatcher channel
    pub events_emitted: u64,

    /// Total individual records carried by those events
    pub records_emitted: u64,

    /// Number of streams that were registered
    pub active_streams: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Replay metrics aggregator
    pub replay_metrics: ReplayMetricsAggregator,
}

impl PipelineStats {
    /// Calculate events per second throughput
    pub fn events_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_emitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Average records per event
    #[allow(dead_code)]
    pub fn records_per_event(&self) -> f64 {
        if self.events_emitted > 0 {
            self.records_emitted as f64 / self.events_emitted as f64
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Events emitted: {}", self.events_emitted);
        println!("   ├─ Records emitted: {}", self.records_emitted);
        println!("   ├─ Events/s: {:.2}", self.events_per_second());
        println!("   ├─ Active streams: {}", self.active_streams);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.replay_metrics.summary();

        println!("\n📈 Timeline Metrics");
        println!("   ├─ Records per event: {}", summary.records_per_event);
        println!("   └─ Event gap (ms): {}", summary.event_gap_ms);

        if !summary.sensor_records.is_empty() {
            println!("\n📡 Records per Sensor");
            let mut sensors: Vec<_> = summary.sensor_records.iter().collect();
            sensors.sort_by_key(|(name, _)| name.as_str());
            for (sensor, count) in sensors {
                println!("   ├─ {}: {}", sensor, count);
            }
        }

        println!();
    }
}
