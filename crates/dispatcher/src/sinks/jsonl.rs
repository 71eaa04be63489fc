//! JsonlSink - appends events to a JSON Lines file
//!
//! One self-describing JSON object per event, matching the record source
//! format so sink output can itself be replayed or post-processed.

use contracts::{ContractError, EventSink, TimelineEvent};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for JsonlSink
#[derive(Debug, Clone)]
pub struct JsonlSinkConfig {
    /// Output file path
    pub path: PathBuf,
}

impl JsonlSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./events.jsonl"));

        Self { path }
    }
}

/// Sink that appends one JSON line per event
pub struct JsonlSink {
    name: String,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines_written: u64,
}

impl JsonlSink {
    /// Create a new JsonlSink, truncating any previous output
    pub fn new(name: impl Into<String>, config: JsonlSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&config.path)?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            writer: Some(BufWriter::new(file)),
            lines_written: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = JsonlSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn write_line(&mut self, event: &TimelineEvent) -> Result<(), ContractError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write("jsonl", "sink already closed"))?;

        let line = serde_json::to_string(event)
            .map_err(|e| ContractError::sink_write("jsonl", format!("serialize error: {e}")))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }
}

impl EventSink for JsonlSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "jsonl_sink_write",
        skip(self, event),
        fields(sink = %self.name, timestamp_ms = event.timestamp_ms)
    )]
    async fn write(&mut self, event: &TimelineEvent) -> Result<(), ContractError> {
        self.write_line(event)
    }

    #[instrument(name = "jsonl_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    #[instrument(name = "jsonl_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        debug!(
            sink = %self.name,
            path = %self.path.display(),
            lines = self.lines_written,
            "JsonlSink closed"
        );
        Ok(())
    }
}
