use std::path::PathBuf;
use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::config::{checked_interval, Code4SwipeConfig};
use crate::core::StrategyKind;
use crate::error::{AppError, AppResult};
use crate::output::OutputFormat;
use crate::provider::ProviderKind;

#[derive(Parser, Debug)]
#[command(name = "code4swipe")]
#[command(version)]
#[command(about = "Monitors a git repo for changes and triggers a \"swipe up\" on your phone to reward you for coding")]
#[command(long_about = "code4swipe polls `git diff` in a repository. Whenever the chosen strategy decides that new work appeared since the previous poll, it asks a provider (adb by default) to swipe up on a connected device. Changes present before monitoring started are never rewarded.")]
pub struct Cli {
    /// Path to the git repository to monitor
    #[arg(long = "repo", value_name = "PATH", help = "Path to the git repository to monitor (defaults to current directory)")]
    pub repo: Option<PathBuf>,

    /// The swipe provider to use
    #[arg(long, default_value = "adb", ignore_case = true, help = "The swipe provider to use")]
    pub provider: ProviderKind,

    /// The strategy to detect new code changes
    #[arg(long, default_value = "exact", ignore_case = true, help = "The strategy to detect new code changes")]
    pub changes: StrategyKind,

    /// Seconds between diff samples
    #[arg(long, value_name = "SECONDS", help = "Interval in seconds between git diff checks [default: 5.0]")]
    pub poll_interval: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging for provider actions")]
    pub verbose: bool,

    /// Optional TOML configuration file
    #[arg(long, value_name = "FILE", help = "Read settings from a TOML file")]
    pub config: Option<PathBuf>,

    /// Device serial passed to the provider
    #[arg(long, value_name = "SERIAL", help = "Target a specific device (adb -s)")]
    pub serial: Option<String>,

    /// Output format for reward events
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,
}

impl Cli {
    pub fn get_repo_path(&self) -> PathBuf {
        self.repo.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }

    /// Apply command-line overrides on top of file and environment settings.
    pub fn apply_to(&self, config: &mut Code4SwipeConfig) {
        if let Some(secs) = self.poll_interval {
            config.poll.interval_secs = secs;
        }

        if let Some(serial) = &self.serial {
            config.adb.serial = Some(serial.clone());
        }
    }

    /// Install the global stderr subscriber. Fails if one is already set.
    pub fn setup_logging(&self) -> anyhow::Result<()> {
        let level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        let filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .try_init()
            .map_err(|err| anyhow!(err))
            .context("failed to install log subscriber")
    }

    pub fn validate(&self) -> AppResult<()> {
        let path = self.get_repo_path();

        if !path.exists() {
            return Err(AppError::Config(format!("Path does not exist: {}", path.display())));
        }

        if !path.is_dir() {
            return Err(AppError::Config(format!("Path is not a directory: {}", path.display())));
        }

        if let Some(secs) = self.poll_interval {
            checked_interval(secs).map_err(AppError::Config)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["code4swipe"]).expect("defaults parse");

        assert!(cli.repo.is_none());
        assert_eq!(cli.provider, ProviderKind::Adb);
        assert_eq!(cli.changes, StrategyKind::Exact);
        assert!(cli.poll_interval.is_none());
        assert!(!cli.verbose);
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "code4swipe",
            "--repo",
            "/tmp",
            "--provider",
            "adb",
            "--changes",
            "LineCount",
            "--poll-interval",
            "0.5",
            "-v",
            "--serial",
            "emulator-5554",
            "--output",
            "json",
        ])
        .expect("flags parse");

        assert_eq!(cli.repo, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.changes, StrategyKind::LineCount);
        assert_eq!(cli.poll_interval, Some(0.5));
        assert!(cli.verbose);
        assert_eq!(cli.output, OutputFormat::Json);

        let mut config = Code4SwipeConfig::default();
        cli.apply_to(&mut config);
        assert_eq!(config.poll.interval_secs, 0.5);
        assert_eq!(config.adb.serial.as_deref(), Some("emulator-5554"));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(Cli::try_parse_from(["code4swipe", "--changes", "fuzzy"]).is_err());
        assert!(Cli::try_parse_from(["code4swipe", "--provider", "bluetooth"]).is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().expect("temp dir");

        let cli = Cli::try_parse_from(["code4swipe", "--repo", dir.path().to_str().unwrap()]).unwrap();
        assert!(cli.validate().is_ok());

        let missing = dir.path().join("missing");
        let cli = Cli::try_parse_from(["code4swipe", "--repo", missing.to_str().unwrap()]).unwrap();
        let err = cli.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("does not exist"));
        assert!(err.hint().is_some());

        let cli = Cli::try_parse_from([
            "code4swipe",
            "--repo",
            dir.path().to_str().unwrap(),
            "--poll-interval",
            "0",
        ])
        .unwrap();
        assert!(cli.validate().is_err());

        for secs in ["1e-12", "1e20"] {
            let cli = Cli::try_parse_from([
                "code4swipe",
                "--repo",
                dir.path().to_str().unwrap(),
                "--poll-interval",
                secs,
            ])
            .unwrap();
            let err = cli.validate().unwrap_err();
            assert!(err.to_string().contains("poll interval"), "{}", secs);
        }
    }

    #[test]
    fn test_second_logging_setup_reports_error() {
        let cli = Cli::try_parse_from(["code4swipe", "-v"]).unwrap();

        let _ = cli.setup_logging();
        let err = cli.setup_logging().unwrap_err();
        assert!(err.to_string().contains("log subscriber"));
    }
}
