//! Diff sampling: snapshots of the uncommitted changes in a repository.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::ffi::OsString;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::config::GitConfig;
use crate::error::{AppError, AppResult, CommandError, SampleError};
use crate::process::run_command;

/// The raw diff text captured on one poll, plus its line count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffSample {
    text: String,
    line_count: usize,
}

impl DiffSample {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_count = text.lines().count();
        Self { text, line_count }
    }

    /// A sample with no uncommitted changes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Compact content hash, used in status messages.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.text.hash(&mut hasher);
        hasher.finish()
    }
}

/// Anything that can produce the current diff of a repository.
#[async_trait]
pub trait DiffSource: Send + Sync {
    async fn capture(&self, repo: &Path) -> Result<DiffSample, SampleError>;
}

/// Samples `git diff` by shelling out to the git executable. No caching:
/// every capture spawns a new process.
#[derive(Debug, Clone)]
pub struct GitDiffSampler {
    program: String,
    timeout: Duration,
}

impl GitDiffSampler {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout(),
        }
    }

    fn repo_args(repo: &Path, rest: &[&str]) -> Vec<OsString> {
        let mut args = vec![OsString::from("-C"), repo.as_os_str().to_owned()];
        args.extend(rest.iter().map(OsString::from));
        args
    }

    /// Startup check: the path must be inside a git working tree.
    pub async fn verify(&self, repo: &Path) -> AppResult<()> {
        let args = Self::repo_args(repo, &["rev-parse", "--is-inside-work-tree"]);
        match run_command(&self.program, &args, self.timeout).await {
            Ok(output) if output.stdout.trim() == "true" => Ok(()),
            Ok(_) => Err(AppError::Config(format!(
                "{} is not inside a git working tree",
                repo.display()
            ))),
            Err(err) => Err(AppError::Config(classify_failure(repo, err).to_string())),
        }
    }
}

#[async_trait]
impl DiffSource for GitDiffSampler {
    async fn capture(&self, repo: &Path) -> Result<DiffSample, SampleError> {
        let args = Self::repo_args(repo, &["diff"]);
        let output = run_command(&self.program, &args, self.timeout)
            .await
            .map_err(|err| classify_failure(repo, err))?;

        let sample = DiffSample::new(output.stdout);
        debug!("Captured diff: {} lines", sample.line_count());
        Ok(sample)
    }
}

fn classify_failure(repo: &Path, err: CommandError) -> SampleError {
    match err {
        CommandError::Failed { ref stderr, .. } if stderr.starts_with("fatal: not a git repository") => {
            SampleError::NotARepository(repo.to_path_buf())
        }
        source => SampleError::DiffUnavailable {
            path: PathBuf::from(repo),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample_has_zero_lines() {
        let sample = DiffSample::empty();
        assert!(sample.is_empty());
        assert_eq!(sample.line_count(), 0);
        assert_eq!(sample, DiffSample::new(""));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(DiffSample::new("+line1\n").line_count(), 1);
        assert_eq!(DiffSample::new("+a\n-b\n c").line_count(), 3);
        assert_eq!(DiffSample::new("\n\n").line_count(), 2);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = DiffSample::new("+a\n");
        let b = DiffSample::new("+b\n");
        assert_eq!(a.fingerprint(), DiffSample::new("+a\n").fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_not_a_repository_is_classified() {
        let err = CommandError::Failed {
            program: "git".to_string(),
            code: Some(128),
            stderr: "fatal: not a git repository (or any of the parent directories): .git".to_string(),
        };
        let classified = classify_failure(Path::new("/tmp/nowhere"), err);
        assert!(matches!(classified, SampleError::NotARepository(_)));
    }

    #[test]
    fn test_other_failures_are_unavailable() {
        let err = CommandError::NotFound { program: "git".to_string() };
        let classified = classify_failure(Path::new("/tmp/repo"), err);
        assert!(matches!(
            classified,
            SampleError::DiffUnavailable { source: CommandError::NotFound { .. }, .. }
        ));
    }

    #[test]
    fn test_repo_args_pass_path_first() {
        let args = GitDiffSampler::repo_args(Path::new("/tmp/repo"), &["diff"]);
        assert_eq!(args, ["-C", "/tmp/repo", "diff"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_repo_args_keep_non_utf8_path_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let repo = Path::new(OsStr::from_bytes(b"/tmp/caf\xe9"));
        let args = GitDiffSampler::repo_args(repo, &["diff"]);

        assert_eq!(args[1].as_bytes(), b"/tmp/caf\xe9");
        assert_eq!(args[2], "diff");
    }
}
