//! Configuration management for code4swipe
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `CODE4SWIPE_*` environment variables. Command-line flags are applied on
//! top by the binary.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 5.0;
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 10_000;
/// One day.
pub const MAX_POLL_INTERVAL_SECS: f64 = 86_400.0;

/// Convert a poll interval in seconds to a non-zero `Duration` of at most
/// [`MAX_POLL_INTERVAL_SECS`].
pub fn checked_interval(secs: f64) -> Result<Duration, String> {
    if !(secs > 0.0 && secs <= MAX_POLL_INTERVAL_SECS) {
        return Err(format!(
            "poll interval must be between 0 and {} seconds, got {}",
            MAX_POLL_INTERVAL_SECS, secs
        ));
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(format!("poll interval {} seconds is too small", secs)),
    }
}

/// Global configuration for code4swipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Code4SwipeConfig {
    /// Poll loop configuration
    pub poll: PollConfig,
    /// Diff sampling configuration
    pub git: GitConfig,
    /// ADB swipe provider configuration
    pub adb: AdbConfig,
}

/// Configuration for the poll loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between diff samples
    pub interval_secs: f64,
}

/// Configuration for the git diff sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// git executable
    pub program: String,
    /// Upper bound on a single `git diff` run
    pub timeout_ms: u64,
}

/// Configuration for the ADB swipe provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdbConfig {
    /// adb executable
    pub program: String,
    /// Target a specific device (`adb -s SERIAL`)
    pub serial: Option<String>,
    /// Upper bound on a single adb run
    pub timeout_ms: u64,
    /// Gesture sent on every reward
    pub swipe: SwipeGesture,
}

/// Screen coordinates and duration of the swipe gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeGesture {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub duration_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
        }
    }
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            serial: None,
            timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            swipe: SwipeGesture::default(),
        }
    }
}

impl Default for SwipeGesture {
    // Bottom-center to top-center.
    fn default() -> Self {
        Self {
            x1: 500,
            y1: 1500,
            x2: 500,
            y2: 500,
            duration_ms: 100,
        }
    }
}

impl PollConfig {
    /// Get poll interval duration
    pub fn interval(&self) -> AppResult<Duration> {
        checked_interval(self.interval_secs).map_err(AppError::Config)
    }
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl AdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SwipeGesture {
    /// Arguments for `input swipe`.
    pub fn to_args(&self) -> Vec<String> {
        [self.x1, self.y1, self.x2, self.y2, self.duration_ms]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }
}

impl Code4SwipeConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        Self::from_toml(&raw)
            .map_err(|err| AppError::Config(format!("{}: {}", path.display(), err)))
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Override with environment variables if present
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = var("CODE4SWIPE_POLL_INTERVAL") {
            match raw.parse::<f64>() {
                Ok(secs) if checked_interval(secs).is_ok() => self.poll.interval_secs = secs,
                _ => warn!("Ignoring invalid CODE4SWIPE_POLL_INTERVAL={}", raw),
            }
        }

        if let Some(program) = var("CODE4SWIPE_GIT") {
            self.git.program = program;
        }

        if let Some(program) = var("CODE4SWIPE_ADB") {
            self.adb.program = program;
        }

        if let Some(serial) = var("CODE4SWIPE_ADB_SERIAL") {
            self.adb.serial = Some(serial);
        }

        if let Some(ms) = var("CODE4SWIPE_COMMAND_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.git.timeout_ms = ms;
            self.adb.timeout_ms = ms;
        }

        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        self.poll.interval()?;

        if self.git.timeout_ms == 0 || self.adb.timeout_ms == 0 {
            return Err(AppError::Config("command timeouts must be greater than 0".to_string()));
        }

        if self.adb.swipe.duration_ms == 0 {
            return Err(AppError::Config("swipe duration must be greater than 0".to_string()));
        }

        Ok(())
    }
}
