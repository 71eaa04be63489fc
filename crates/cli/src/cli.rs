//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Replay Syncer - Time-synchronized multi-sensor stream replay
#[derive(Parser, Debug)]
#[command(
    name = "replay-syncer",
    author,
    version,
    about = "Multi-sensor stream replay and synchronization pipeline",
    long_about = "Replays recorded multi-sensor JSON Lines streams on a common world\n\
                  clock: loads every configured stream, merges them chronologically or\n\
                  plays them back against a frame clock, and dispatches the resulting\n\
                  timeline events to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "REPLAY_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "REPLAY_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the replay pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "replay.toml",
        env = "REPLAY_SYNCER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override replay mode from configuration
    #[arg(long, value_enum, env = "REPLAY_SYNCER_MODE")]
    pub mode: Option<ModeArg>,

    /// Override paced-mode speed multiplier from configuration
    #[arg(long, env = "REPLAY_SYNCER_SPEED")]
    pub speed: Option<f64>,

    /// Maximum number of events to emit (0 = unlimited)
    #[arg(long, default_value = "0", env = "REPLAY_SYNCER_MAX_EVENTS")]
    pub max_events: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for the dispatcher queue
    #[arg(long, default_value = "100", env = "REPLAY_SYNCER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "REPLAY_SYNCER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "replay.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "replay.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Load every stream and show record counts and time ranges
    #[arg(long)]
    pub streams: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Replay mode override
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Exactly-once chronological drain
    Drain,
    /// Paced playback on a frame clock
    Paced,
}

impl From<ModeArg> for contracts::ReplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Drain => Self::Drain,
            ModeArg::Paced => Self::Paced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "replay-syncer",
            "run",
            "--config",
            "session.toml",
            "--mode",
            "paced",
            "--max-events",
            "50",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("session.toml"));
                assert!(matches!(args.mode, Some(ModeArg::Paced)));
                assert_eq!(args.max_events, 50);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["replay-syncer", "-v", "-q", "validate"]);
        assert!(result.is_err());
    }
}
