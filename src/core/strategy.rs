//! Change-detection strategies
//!
//! A strategy compares each new [`DiffSample`] against the baseline left by
//! the previous poll and decides whether the change deserves a reward. The
//! baseline is replaced after every evaluation, whether or not it fired.
//! The very first evaluation only seeds the baseline, so a diff that
//! existed before monitoring started is never rewarded.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sample::DiffSample;

/// Which rule decides that new work happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Any byte-level change to the diff, deletions included
    Exact,
    /// The diff grew by at least one line
    #[value(name = "linecount")]
    LineCount,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::LineCount => "linecount",
        }
    }

    fn is_new_work(&self, previous: &DiffSample, current: &DiffSample) -> bool {
        match self {
            StrategyKind::Exact => previous.text() != current.text(),
            StrategyKind::LineCount => current.line_count() > previous.line_count(),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy instance together with the baseline it owns.
#[derive(Debug, Clone)]
pub struct ChangeStrategy {
    kind: StrategyKind,
    baseline: Option<DiffSample>,
}

impl ChangeStrategy {
    pub fn new(kind: StrategyKind) -> Self {
        Self { kind, baseline: None }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn baseline(&self) -> Option<&DiffSample> {
        self.baseline.as_ref()
    }

    /// Returns true when `current` should trigger a reward, then stores it as
    /// the new baseline.
    pub fn evaluate(&mut self, current: DiffSample) -> bool {
        let triggered = match &self.baseline {
            Some(previous) => self.kind.is_new_work(previous, &current),
            None => false,
        };
        self.baseline = Some(current);
        triggered
    }

    /// One-line description of the seeded baseline.
    pub fn status_message(&self) -> String {
        let Some(baseline) = &self.baseline else {
            return "No baseline yet. Waiting for the first sample...".to_string();
        };

        match self.kind {
            StrategyKind::Exact => format!(
                "Initial diff hash: {:016x}. Waiting for ANY change...",
                baseline.fingerprint()
            ),
            StrategyKind::LineCount => format!(
                "Initial diff lines: {}. Waiting for new code...",
                baseline.line_count()
            ),
        }
    }
}
