//! Bounded execution of external commands (git, adb).

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::CommandError;

/// Captured output of a command that exited successfully.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Longest stream excerpt written to the debug log.
const PREVIEW_CHARS: usize = 2000;

/// Render a command line the way a user would type it.
pub fn display_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    std::iter::once(Cow::Borrowed(program))
        .chain(args.iter().map(|arg| arg.as_ref().to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trim `text` to at most [`PREVIEW_CHARS`] characters for logging.
pub fn preview(text: &str) -> String {
    let text = text.trim_end();
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &text[..cut], text.len()),
        None => text.to_string(),
    }
}

/// Run `program` with `args`, killing it if it does not finish within `timeout`.
///
/// A non-zero exit status is an error; stdout and stderr are decoded lossily.
/// Arguments are passed to the OS untouched, so non-UTF-8 paths survive.
pub async fn run_command<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    debug!("Running: {}", display_command(program, args));

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) if err.kind() == ErrorKind::NotFound => {
            return Err(CommandError::NotFound { program: program.to_string() });
        }
        Ok(Err(err)) => {
            return Err(CommandError::Spawn { program: program.to_string(), source: err });
        }
        Err(_) => {
            return Err(CommandError::TimedOut { program: program.to_string(), timeout });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    trace!(status = ?output.status, stdout_len = stdout.len(), "{} finished", program);
    if !stdout.trim().is_empty() {
        debug!("{} stdout: {}", program, preview(&stdout));
    }
    if !stderr.is_empty() {
        debug!("{} stderr: {}", program, preview(&stderr));
    }

    if !output.status.success() {
        return Err(CommandError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}
