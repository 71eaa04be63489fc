//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use sync_engine::SensorStream;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    playback: PlaybackInfo,
    streams: Vec<StreamInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct PlaybackInfo {
    mode: String,
    frame_interval_ms: f64,
    speed: f64,
}

#[derive(Serialize)]
struct StreamInfo {
    name: String,
    path: String,
    time_offset_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tolerance_ms: Option<f64>,
    strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<StreamDataInfo>,
}

/// Populated only with `--streams` (requires loading the source)
#[derive(Serialize)]
struct StreamDataInfo {
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    native_range_ms: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    world_range_ms: Option<(f64, f64)>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let mut streams = Vec::with_capacity(blueprint.streams.len());
    for config in &blueprint.streams {
        let data = if args.streams {
            let stream = SensorStream::load(config)
                .with_context(|| format!("Failed to load stream '{}'", config.name))?;
            Some(stream_data_info(&stream))
        } else {
            None
        };

        streams.push(StreamInfo {
            name: config.name.to_string(),
            path: config.path.display().to_string(),
            time_offset_ms: config.time_offset_ms,
            tolerance_ms: config.tolerance_ms,
            strategy: config.strategy.to_string(),
            data,
        });
    }

    let config_info = ConfigInfo {
        version: format!("{:?}", blueprint.version),
        playback: PlaybackInfo {
            mode: format!("{:?}", blueprint.playback.mode),
            frame_interval_ms: blueprint.playback.frame_interval_ms,
            speed: blueprint.playback.speed,
        },
        streams,
        sinks: blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect(),
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&config_info).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_config_info(&config_info);
    }

    Ok(())
}

fn stream_data_info(stream: &SensorStream) -> StreamDataInfo {
    let native_range_ms = stream
        .min_timestamp()
        .and_then(|min| stream.max_timestamp().map(|max| (min, max)));
    let world_range_ms = native_range_ms
        .map(|(min, max)| (min + stream.time_offset_ms(), max + stream.time_offset_ms()));

    StreamDataInfo {
        records: stream.len(),
        native_range_ms,
        world_range_ms,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("\n=== Replay Configuration ===\n");
    println!("Version: {}", info.version);
    println!(
        "Playback: {} ({}ms frame clock, speed x{})",
        info.playback.mode, info.playback.frame_interval_ms, info.playback.speed
    );

    println!("\nStreams ({}):", info.streams.len());
    for stream in &info.streams {
        let tolerance = stream
            .tolerance_ms
            .map_or_else(|| "unbounded".to_string(), |t| format!("{t} ms"));
        println!(
            "  - {} <- {} (offset {} ms, tolerance {}, {})",
            stream.name, stream.path, stream.time_offset_ms, tolerance, stream.strategy
        );
        if let Some(ref data) = stream.data {
            println!("      records: {}", data.records);
            if let Some((min, max)) = data.native_range_ms {
                println!("      native range: [{min} ms, {max} ms]");
            }
            if let Some((min, max)) = data.world_range_ms {
                println!("      world range:  [{min} ms, {max} ms]");
            }
        }
    }

    if !info.sinks.is_empty() {
        println!("\nSinks ({}):", info.sinks.len());
        for sink in &info.sinks {
            println!("  - {} ({})", sink.name, sink.sink_type);
        }
    }
    println!();
}
