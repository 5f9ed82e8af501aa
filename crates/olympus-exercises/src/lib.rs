//! Exercise drivers
//!
//! Each exercise module holds the reference solution and the fixed test table
//! of one exercise. The binaries in `src/bin` run a table against the
//! `student` crate and print the report to stdout.

pub mod displaya;
pub mod raid1b;

use std::io::Write;

use anyhow::{Context, Result};
use minos::{Config, Dispatcher, Harness, HarnessResult, RunSummary, metrics, random};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; logs go to stderr so they never mix with the report.
///
/// Only the first call in a process installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minos=info,olympus_exercises=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Shared body of every driver binary
pub fn run<F>(exercise: &str, programs: Dispatcher, drive: F) -> Result<()>
where
    F: FnOnce(&mut Harness) -> HarnessResult<()>,
{
    dotenvy::dotenv().ok();
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Environment: {}", config.environment);

    let harness = Harness::new(exercise, &config).with_programs(programs);
    run_with(&config, harness, drive)
}

/// Drive one exercise on `harness` under `config` and decide the exit status
pub fn run_with<W, F>(config: &Config, mut harness: Harness<W>, drive: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut Harness<W>) -> HarnessResult<()>,
{
    apply_random(config);

    let exercise = harness.summary().exercise.clone();
    drive(&mut harness).with_context(|| format!("{} driver aborted", exercise))?;
    let summary = harness.finish()?;

    if config.dump_metrics {
        eprint!("{}", metrics::render());
    }

    check_exit(config, &summary)
}

/// Apply the seed and word-list shape of `config` to the shared random source
pub fn apply_random(config: &Config) {
    if let Some(seed) = config.random.seed {
        random::reseed(seed);
    }
    random::configure_words(config.random.words);
}

/// A strict run fails when any case did not match
pub fn check_exit(config: &Config, summary: &RunSummary) -> Result<()> {
    if config.report.strict && !summary.all_matched() {
        anyhow::bail!(
            "{} of {} cases did not match",
            summary.total - summary.matched,
            summary.total
        );
    }
    Ok(())
}

/// Serializes tests that touch the shared random source
#[cfg(test)]
pub(crate) fn random_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
