use anyhow::{Context, Result};
use clap::Parser;

use code4swipe::{
    cli::Cli,
    config::Code4SwipeConfig,
    core::{ChangeStrategy, GitDiffSampler, PollLoop},
    error::AppError,
    shutdown::Shutdown,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        report_fatal(&err);
        std::process::exit(1);
    }

    cli.setup_logging().context("Failed to initialize logging")?;
    tracing::debug!("Verbose mode enabled.");

    if let Err(err) = run(&cli).await {
        report_fatal(&err);
        eprintln!("Failed to initialize. Exiting.");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let repo = cli.get_repo_path();

    let mut config = Code4SwipeConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let sampler = GitDiffSampler::new(&config.git);
    sampler.verify(&repo).await?;

    let shutdown = Shutdown::install_ctrlc()?;
    let provider = cli.provider.build(&config);
    let interval = config.poll.interval()?;

    let mut poll = PollLoop::new(repo, sampler, ChangeStrategy::new(cli.changes), provider, interval)
        .with_output(cli.output);
    let summary = poll.start(shutdown).await?;

    tracing::info!(
        cycles = summary.cycles,
        rewards = summary.rewards,
        reward_failures = summary.reward_failures,
        sample_failures = summary.sample_failures,
        "Poll loop stopped"
    );

    if cli.output.is_text() {
        println!();
        println!("Exiting. Happy coding! ({} swipes earned)", summary.rewards);
    }

    Ok(())
}

fn report_fatal(err: &AppError) {
    eprintln!("Error: {}", err);
    if let Some(hint) = err.hint() {
        eprintln!("Hint: {}", hint);
    }
}
