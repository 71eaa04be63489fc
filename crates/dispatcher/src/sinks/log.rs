//! LogSink - logs event summary via tracing

use contracts::{ContractError, EventSink, TimelineEvent};
use tracing::{info, instrument};

/// Sink that logs event summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event_summary(&self, event: &TimelineEvent) {
        let mut sensors: Vec<&str> = event.records.keys().map(|n| n.as_str()).collect();
        sensors.sort_unstable();

        info!(
            sink = %self.name,
            timestamp_ms = event.timestamp_ms,
            sensors = ?sensors,
            records = event.record_count(),
            "TimelineEvent received"
        );
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, event),
        fields(sink = %self.name, timestamp_ms = event.timestamp_ms)
    )]
    async fn write(&mut self, event: &TimelineEvent) -> Result<(), ContractError> {
        self.log_event_summary(event);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
