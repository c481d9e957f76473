//! CLI argument definitions
//!
//! All Clap derive structs for `simon` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Sequence-memory game for the terminal.
#[derive(Parser, Debug)]
#[command(name = "simon", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SIMON_COLOR")]
    pub color: ColorChoice,

    /// Log output format on stderr.
    #[arg(
        long,
        value_enum,
        default_value = "human",
        global = true,
        env = "SIMON_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a game, reading moves from stdin.
    Play(PlayArgs),

    /// Print the leaderboard.
    Scores(ScoresArgs),

    /// Validate configuration files without playing.
    Validate(ValidateArgs),

    /// Print the default configuration as YAML.
    Config,
}

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "SIMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the leaderboard file.
    #[arg(short, long, env = "SIMON_SCORES")]
    pub scores: Option<PathBuf>,

    /// Seed for a reproducible sequence.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Player nickname (prompted for when absent).
    #[arg(short, long, env = "SIMON_NICKNAME")]
    pub nickname: Option<String>,

    /// Write structured game events (JSONL) to this file.
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "SIMON_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Ring the terminal bell when a signal sounds.
    #[arg(long)]
    pub bell: bool,
}

/// Arguments for `scores`.
#[derive(Args, Debug)]
pub struct ScoresArgs {
    /// Path to the leaderboard file.
    #[arg(short, long, env = "SIMON_SCORES")]
    pub scores: Option<PathBuf>,

    /// Path to YAML configuration file (for leaderboard limits).
    #[arg(short, long, env = "SIMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_with_options() {
        let cli = Cli::try_parse_from([
            "simon",
            "play",
            "--config",
            "game.yaml",
            "--seed",
            "42",
            "--nickname",
            "ada",
        ])
        .unwrap();
        let Commands::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.nickname.as_deref(), Some("ada"));
        assert_eq!(args.config, Some(PathBuf::from("game.yaml")));
    }

    #[test]
    fn test_validate_requires_files() {
        assert!(Cli::try_parse_from(["simon", "validate"]).is_err());
        assert!(Cli::try_parse_from(["simon", "validate", "a.yaml", "--strict"]).is_ok());
    }

    #[test]
    fn test_scores_default_format() {
        let cli = Cli::try_parse_from(["simon", "scores"]).unwrap();
        let Commands::Scores(args) = cli.command else {
            panic!("expected scores");
        };
        assert_eq!(args.format, OutputFormat::Human);
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["simon", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["simon", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["simon", "-vv", "--color", "never", "config"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.log_format, LogFormat::Human);
    }

    #[test]
    fn test_log_format_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["simon", "validate", "a.yaml", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(Cli::try_parse_from(["simon", "--log-format", "xml", "config"]).is_err());
    }

    #[test]
    fn test_bad_seed_rejected() {
        assert!(Cli::try_parse_from(["simon", "play", "--seed", "abc"]).is_err());
    }
}
