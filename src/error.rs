//! Error types for code4swipe
//!
//! Only configuration and startup errors ([`AppError`]) are fatal. Sampling
//! and provider errors are reported per poll cycle and never stop the loop.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to run an external command to completion.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("`{program}` was not found. Is it installed and in your PATH?")]
    NotFound { program: String },

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("`{program}` exited with {}: {stderr}", exit_code_label(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// A diff sample could not be captured this cycle.
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("{} is not a valid git repository", .0.display())]
    NotARepository(PathBuf),

    #[error("diff unavailable for {}: {source}", path.display())]
    DiffUnavailable {
        path: PathBuf,
        #[source]
        source: CommandError,
    },
}

/// The swipe provider could not perform its action.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("device rejected the command: {0}")]
    Rejected(String),
}

impl ProviderError {
    pub fn hint(&self) -> &'static str {
        match self {
            ProviderError::Command(CommandError::NotFound { .. }) => {
                "Please ensure the device-bridge tool is installed and in your PATH."
            }
            _ => "Is your Android device connected and USB debugging enabled?",
        }
    }
}

/// Fatal errors: reported before the poll loop starts.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("provider `{provider}` failed availability check")]
    ProviderUnavailable { provider: String },

    #[error("failed to install interrupt handler: {0}")]
    Interrupt(#[from] ctrlc::Error),
}

impl AppError {
    /// Remediation hint printed alongside the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            AppError::Config(_) => Some("check --repo, --poll-interval, --config and the CODE4SWIPE_* environment variables"),
            AppError::ProviderUnavailable { .. } => Some(
                "ensure the device-bridge tool (adb) is on PATH and a device is connected with USB debugging enabled",
            ),
            AppError::Interrupt(_) => None,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_command_message() {
        let err = CommandError::Failed {
            program: "git".to_string(),
            code: Some(128),
            stderr: "fatal: bad revision".to_string(),
        };
        assert_eq!(err.to_string(), "`git` exited with status 128: fatal: bad revision");

        let killed = CommandError::Failed {
            program: "adb".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(killed.to_string().contains("a signal"));
    }

    #[test]
    fn test_provider_hints() {
        let missing = ProviderError::Command(CommandError::NotFound { program: "adb".to_string() });
        assert!(missing.hint().contains("PATH"));

        let rejected = ProviderError::Rejected("error: no devices/emulators found".to_string());
        assert!(rejected.hint().contains("USB debugging"));
    }

    #[test]
    fn test_fatal_errors_carry_hints() {
        let err = AppError::ProviderUnavailable { provider: "adb".to_string() };
        assert!(err.hint().unwrap().contains("on PATH"));
        assert!(AppError::Config("bad".to_string()).hint().is_some());
    }
}
