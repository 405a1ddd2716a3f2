//! Core functionality module
//!
//! Contains diff sampling, change detection and the poll loop

pub mod sample;
pub mod strategy;
pub mod poll;

// Re-export main types
pub use sample::{DiffSample, DiffSource, GitDiffSampler};
pub use strategy::{ChangeStrategy, StrategyKind};
pub use poll::{CycleOutcome, LoopSummary, PollLoop};
