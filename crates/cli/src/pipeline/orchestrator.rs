//! Pipeline orchestrator - coordinates all components.
//!
//! Loads every configured stream into a `SensorDataManager`, then drives the
//! merged timeline into the dispatcher: either draining it chronologically as
//! fast as the sinks allow, or pacing it against a real-time frame clock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ReplayBlueprint, ReplayMode, TimelineEvent};
use dispatcher::create_dispatcher;
use observability::{record_event_emitted, ReplayMetricsAggregator};
use sync_engine::{SensorDataManager, SensorPlayback};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The replay blueprint configuration
    pub blueprint: ReplayBlueprint,

    /// Maximum number of events to emit (None = unlimited)
    pub max_events: Option<u64>,

    /// Channel buffer size towards the dispatcher
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

/// Running totals for the emitting side of the pipeline
#[derive(Default)]
struct EmitTally {
    events: u64,
    records: u64,
    aggregator: ReplayMetricsAggregator,
}

impl EmitTally {
    fn note(&mut self, event: &TimelineEvent) {
        record_event_emitted(event);
        self.aggregator.update(event);
        self.events += 1;
        self.records += event.record_count() as u64;
    }
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Load streams off the runtime - construction is blocking file IO
        info!(streams = blueprint.streams.len(), "Loading sensor streams...");
        let stream_configs = blueprint.streams.clone();
        let manager = tokio::task::spawn_blocking(move || {
            SensorDataManager::from_configs(&stream_configs)
        })
        .await
        .context("Stream loading task panicked")?
        .context("Failed to load sensor streams")?;
        let manager = Arc::new(manager);

        info!(
            streams = manager.len(),
            records = manager.total_records(),
            "Sensor streams loaded"
        );

        // Create dispatcher
        let (event_tx, event_rx) = mpsc::channel::<TimelineEvent>(self.config.buffer_size);
        let dispatcher = create_dispatcher(blueprint.sinks.clone(), event_rx)
            .await
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        // Drive the timeline
        let tally = match blueprint.playback.mode {
            ReplayMode::Drain => self.run_drain(&manager, event_tx).await,
            ReplayMode::Paced => self.run_paced(&manager, event_tx).await,
        };

        // Sender dropped inside the drivers; wait for sinks to flush
        dispatcher_handle
            .await
            .context("Dispatcher task panicked")?;

        Ok(PipelineStats {
            events_emitted: tally.events,
            records_emitted: tally.records,
            active_streams: manager.len(),
            active_sinks: blueprint.sinks.len(),
            duration: start_time.elapsed(),
            replay_metrics: tally.aggregator,
        })
    }

    /// Drain the merged timeline chronologically, as fast as sinks allow.
    async fn run_drain(
        &self,
        manager: &Arc<SensorDataManager>,
        event_tx: mpsc::Sender<TimelineEvent>,
    ) -> EmitTally {
        info!("Draining merged timeline");
        let mut tally = EmitTally::default();

        for event in manager.iter_events() {
            tally.note(&event);

            if event_tx.send(event).await.is_err() {
                warn!("Dispatcher channel closed, stopping drain");
                break;
            }

            if self.reached_max(tally.events) {
                info!(events = tally.events, "Reached max events, stopping drain");
                break;
            }
        }

        tally
    }

    /// Play the timeline back against a real-time frame clock.
    async fn run_paced(
        &self,
        manager: &Arc<SensorDataManager>,
        event_tx: mpsc::Sender<TimelineEvent>,
    ) -> EmitTally {
        let mut tally = EmitTally::default();

        let Some((world_start, world_end)) = manager.world_time_range() else {
            warn!("No records in any stream, nothing to play back");
            return tally;
        };

        let playback_config = &self.config.blueprint.playback;
        let frame_interval_ms = playback_config.frame_interval_ms;
        let tick_period =
            Duration::from_secs_f64(frame_interval_ms / playback_config.speed / 1000.0);

        info!(
            world_start,
            world_end,
            frame_interval_ms,
            speed = playback_config.speed,
            "Starting paced playback"
        );

        let mut playback = SensorPlayback::new(Arc::clone(manager));
        let mut interval = tokio::time::interval(tick_period);
        let mut clock_ms = world_start;

        loop {
            interval.tick().await;

            let slice = playback.advance(clock_ms);
            if !slice.is_empty() {
                let event = TimelineEvent::from_slice(clock_ms, slice);
                tally.note(&event);

                if event_tx.send(event).await.is_err() {
                    warn!("Dispatcher channel closed, stopping playback");
                    break;
                }

                if self.reached_max(tally.events) {
                    info!(events = tally.events, "Reached max events, stopping playback");
                    break;
                }
            }

            if clock_ms >= world_end {
                debug!("Frame clock passed the last record, playback complete");
                break;
            }
            clock_ms += frame_interval_ms;
        }

        tally
    }

    fn reached_max(&self, events: u64) -> bool {
        self.config
            .max_events
            .is_some_and(|max| events >= max)
    }
}
