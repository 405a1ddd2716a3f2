//! The poll loop: sample, evaluate, reward, sleep, repeat.
//!
//! Each cycle runs to completion before the next tick is awaited, so cycles
//! never overlap. A failed sample leaves the strategy baseline untouched, so
//! a transient git failure cannot hide a later change.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::sample::DiffSource;
use super::strategy::ChangeStrategy;
use crate::error::{AppError, AppResult, ProviderError, SampleError};
use crate::output::{OutputFormat, RewardEvent};
use crate::provider::SwipeProvider;
use crate::shutdown::Shutdown;

/// What happened during one evaluating cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// First successful sample: baseline seeded, never rewarded
    Seeded { lines: usize },
    /// Strategy saw nothing worth rewarding
    NoReward { lines: usize },
    /// Strategy fired and the provider performed the swipe
    Rewarded { lines: usize },
    /// Strategy fired but the provider failed
    RewardFailed { lines: usize, error: ProviderError },
    /// No sample could be captured; baseline preserved
    SampleFailed(SampleError),
}

impl CycleOutcome {
    pub fn triggered(&self) -> bool {
        matches!(self, CycleOutcome::Rewarded { .. } | CycleOutcome::RewardFailed { .. })
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: usize,
    pub rewards: usize,
    pub reward_failures: usize,
    pub sample_failures: usize,
}

impl LoopSummary {
    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Rewarded { .. } => self.rewards += 1,
            CycleOutcome::RewardFailed { .. } => self.reward_failures += 1,
            CycleOutcome::SampleFailed(_) => self.sample_failures += 1,
            CycleOutcome::Seeded { .. } | CycleOutcome::NoReward { .. } => {}
        }
    }
}

pub struct PollLoop<D, P> {
    repo: PathBuf,
    sampler: D,
    strategy: ChangeStrategy,
    provider: P,
    interval: Duration,
    output: OutputFormat,
}

impl<D: DiffSource, P: SwipeProvider> PollLoop<D, P> {
    pub fn new(
        repo: impl Into<PathBuf>,
        sampler: D,
        strategy: ChangeStrategy,
        provider: P,
        interval: Duration,
    ) -> Self {
        Self {
            repo: repo.into(),
            sampler,
            strategy,
            provider,
            interval,
            output: OutputFormat::Text,
        }
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    pub fn strategy(&self) -> &ChangeStrategy {
        &self.strategy
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one evaluating cycle.
    pub async fn tick(&mut self) -> CycleOutcome {
        let sample = match self.sampler.capture(&self.repo).await {
            Ok(sample) => sample,
            Err(err) => {
                warn!("Skipping cycle, could not sample diff: {}", err);
                return CycleOutcome::SampleFailed(err);
            }
        };

        let lines = sample.line_count();
        let seeding = self.strategy.baseline().is_none();

        if !self.strategy.evaluate(sample) {
            if seeding {
                info!("{}", self.strategy.status_message());
                return CycleOutcome::Seeded { lines };
            }
            debug!("No new work ({} diff lines)", lines);
            return CycleOutcome::NoReward { lines };
        }

        let event = RewardEvent::new(self.strategy.kind(), self.provider.name(), lines);
        match self.provider.trigger().await {
            Ok(()) => {
                println!("{}", self.output.render(&event));
                CycleOutcome::Rewarded { lines }
            }
            Err(err) => {
                error!("Error executing swipe: {}", err);
                error!("Hint: {}", err.hint());
                println!("{}", self.output.render(&event.failed(&err)));
                CycleOutcome::RewardFailed { lines, error: err }
            }
        }
    }

    /// Check the provider, then poll until `shutdown` fires. The loop never
    /// starts if the provider is unavailable.
    pub async fn start(&mut self, shutdown: Shutdown) -> AppResult<LoopSummary> {
        if !self.provider.check_availability().await {
            return Err(AppError::ProviderUnavailable {
                provider: self.provider.name().to_string(),
            });
        }
        info!("Provider {} is available", self.provider.name());

        if self.output.is_text() {
            println!("---");
            println!(
                "Monitoring git diff in: `{}` using `{}` strategy.",
                self.repo.display(),
                self.strategy.kind()
            );
            println!("Polling interval: {} seconds.", self.interval.as_secs_f64());
            println!("Press CTRL+C to exit.");
        }

        Ok(self.run(shutdown).await)
    }

    /// Poll until `shutdown` fires. The first tick happens immediately.
    ///
    /// An interrupt that arrives mid-cycle abandons that cycle; any child
    /// process it spawned is killed when its future is dropped.
    pub async fn run(&mut self, mut shutdown: Shutdown) -> LoopSummary {
        let mut summary = LoopSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = ticker.tick() => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = shutdown.wait() => {
                    debug!("Interrupted mid-cycle");
                    break;
                }
                outcome = self.tick() => outcome,
            };
            summary.record(&outcome);
        }

        summary
    }
}

