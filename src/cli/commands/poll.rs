//! Poll command implementation.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::interrupt::{self, INTERRUPTED_EXIT_CODE};
use crate::cli::progress::{poll_progress_bar, spawn_renderer};
use crate::config::{PollParams, Settings, DEFAULT_BATCH_SIZE};
use crate::scrapers::{HtmlExtractor, HttpClient};
use crate::services::{
    BatchScheduler, CasePoller, Reporter, RunState, SchedulerPhase, StatusClassifier,
};
use crate::utils::{format_duration, plural, SystemClock};

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Identifier prefix (e.g. IOE)
    #[arg(short, long, env = "CASEPOLL_PREFIX")]
    prefix: String,

    /// First sequence number to poll
    #[arg(short, long, env = "CASEPOLL_START", allow_negative_numbers = true)]
    start: i64,

    /// Number of identifiers to poll
    #[arg(short = 'n', long, default_value = "1", allow_negative_numbers = true)]
    count: i64,

    /// Lookups in flight per batch
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE as i64, allow_negative_numbers = true)]
    batch_size: i64,

    /// Write grouped per-day results to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write per-case results to this CSV file (overrides config)
    #[arg(long)]
    raw_output: Option<PathBuf>,

    /// Status endpoint (overrides config)
    #[arg(long, env = "CASEPOLL_ENDPOINT")]
    endpoint: Option<String>,

    /// Delay after each lookup in milliseconds (overrides config)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// User agent: a custom string, or "impersonate" for a browser user agent
    #[arg(long, env = "CASEPOLL_USER_AGENT")]
    user_agent: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

impl PollArgs {
    pub fn params(&self) -> PollParams {
        PollParams {
            prefix: self.prefix.clone(),
            start: self.start,
            count: self.count,
            batch_size: self.batch_size,
            output: self.output.clone(),
        }
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(path) = &self.raw_output {
            settings.raw_output = path.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(delay) = self.delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(ua) = &self.user_agent {
            settings.user_agent = Some(ua.clone());
        }
        if self.insecure {
            settings.accept_invalid_certs = true;
        }
    }
}

/// Poll a range of identifiers, then report on what was collected.
pub async fn cmd_poll(mut settings: Settings, args: PollArgs) -> anyhow::Result<()> {
    let started = Instant::now();
    args.apply_overrides(&mut settings);

    // Fail fast before any client is built
    let params = args.params();
    let (range, batch_size) = params.validate(settings.id_width)?;

    let transport = Arc::new(HttpClient::new(&settings)?);
    let extractor = Arc::new(HtmlExtractor::new(&settings.selectors)?);

    let mut state = RunState::new();
    let poller = Arc::new(CasePoller::new(
        transport,
        extractor,
        StatusClassifier::new(Arc::new(SystemClock)),
        state.block_signal(),
    ));

    let cancel = CancellationToken::new();
    interrupt::install(cancel.clone());

    let first = range.get(0).map(|id| id.to_string()).unwrap_or_default();
    let last = range
        .get(range.len().saturating_sub(1))
        .map(|id| id.to_string())
        .unwrap_or_default();
    println!(
        "{} Polling {} ({} to {}) in batches of {}",
        style("→").cyan(),
        plural(range.len(), "case"),
        first,
        last,
        batch_size
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(poll_progress_bar(range.len() as u64), rx);

    let mut scheduler = BatchScheduler::new(poller, batch_size, cancel).with_events(tx);
    let outcome = scheduler.run(&range, &mut state).await;
    drop(scheduler);
    let _ = renderer.await;

    match outcome.phase {
        SchedulerPhase::Blocked => println!(
            "{} The remote service is blocking requests. Stopped after {} of {} identifiers; reporting what was collected.",
            style("!").yellow(),
            state.cursor(),
            range.len()
        ),
        SchedulerPhase::Draining => println!(
            "{} Interrupted after {} of {} identifiers; reporting what was collected.",
            style("!").yellow(),
            state.cursor(),
            range.len()
        ),
        _ => println!(
            "{} Polled {} in {} batches ({} reached a case page)",
            style("✓").green(),
            plural(outcome.lookups, "case"),
            outcome.batches_completed,
            state
                .results()
                .iter()
                .filter(|r| r.status.is_case_status())
                .count()
        ),
    }
    println!();

    let reporter = Reporter::new(settings.raw_output.clone(), params.output.clone());
    let report = reporter.report(state.results(), &mut io::stdout().lock());

    println!();
    for path in report.raw_written.iter().chain(report.grouped_written.iter()) {
        println!("{} Wrote {}", style("✓").green(), path.display());
    }
    for failure in &report.failures {
        println!("{} {}", style("✗").red(), failure);
    }

    let elapsed = started.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    if outcome.phase == SchedulerPhase::Draining {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PollArgs {
        PollArgs {
            prefix: "IOE".to_string(),
            start: 1,
            count: 2,
            batch_size: 2,
            output: None,
            raw_output: Some(PathBuf::from("cases.csv")),
            endpoint: None,
            delay_ms: Some(150),
            user_agent: Some("impersonate".to_string()),
            insecure: true,
        }
    }

    #[test]
    fn test_overrides_apply_to_settings() {
        let mut settings = Settings::default();
        args().apply_overrides(&mut settings);

        assert_eq!(settings.raw_output, PathBuf::from("cases.csv"));
        assert_eq!(settings.request_delay_ms, 150);
        assert_eq!(settings.user_agent.as_deref(), Some("impersonate"));
        assert!(settings.accept_invalid_certs);
        assert_eq!(settings.endpoint, crate::config::DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_invalid_range_fails_before_network() {
        let mut bad = args();
        bad.count = 0;
        let err = cmd_poll(Settings::default(), bad).await.unwrap_err();
        assert!(err
            .downcast_ref::<crate::error::PollError>()
            .is_some_and(|e| matches!(e, crate::error::PollError::InvalidRange(_))));
    }
}
