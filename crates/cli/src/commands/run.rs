//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(mode) = args.mode {
        info!(mode = ?mode, "Overriding replay mode from CLI");
        blueprint.playback.mode = mode.into();
    }
    if let Some(speed) = args.speed {
        if speed <= 0.0 {
            anyhow::bail!("--speed must be > 0, got {speed}");
        }
        info!(speed, "Overriding replay speed from CLI");
        blueprint.playback.speed = speed;
    }

    info!(
        mode = ?blueprint.playback.mode,
        streams = blueprint.streams.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_events: if args.max_events == 0 {
            None
        } else {
            Some(args.max_events)
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        events_emitted = stats.events_emitted,
                        records_emitted = stats.records_emitted,
                        duration_secs = stats.duration.as_secs_f64(),
                        eps = format!("{:.2}", stats.events_per_second()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Replay Syncer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::ReplayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Playback:");
    println!("  Mode: {:?}", blueprint.playback.mode);
    println!(
        "  Frame interval: {:.1} ms (speed x{})",
        blueprint.playback.frame_interval_ms, blueprint.playback.speed
    );
    println!("\nStreams ({}):", blueprint.streams.len());
    for stream in &blueprint.streams {
        let tolerance = stream
            .tolerance_ms
            .map_or_else(|| "unbounded".to_string(), |t| format!("{t} ms"));
        println!(
            "  - {} <- {} (offset {} ms, tolerance {}, {})",
            stream.name,
            stream.path.display(),
            stream.time_offset_ms,
            tolerance,
            stream.strategy
        );
    }
    println!("\nSinks ({}):", blueprint.sinks.len());
    for sink in &blueprint.sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
    }
    println!();
}
