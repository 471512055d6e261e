//! Console rendering of scheduler progress events.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::services::{PollEvent, SchedulerPhase};

/// Progress bar over the identifier count, advanced per completed batch.
pub fn poll_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({per_sec}, eta {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    bar.set_style(style);
    bar.set_message("Polling");
    bar
}

/// Render events until the scheduler drops its sender.
pub fn spawn_renderer(
    bar: ProgressBar,
    mut rx: mpsc::UnboundedReceiver<PollEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PollEvent::BatchStarted { index, size } => {
                    bar.set_message(format!("Batch {} ({} lookups)", index + 1, size));
                }
                PollEvent::BatchCompleted { size, .. } => {
                    bar.inc(size as u64);
                }
                PollEvent::Blocked { batches_completed } => {
                    bar.println(format!(
                        "{} Remote service is blocking lookups; stopping after {} batch(es)",
                        style("!").yellow(),
                        batches_completed
                    ));
                }
                PollEvent::Interrupted {
                    batches_completed,
                    abandoned,
                } => {
                    bar.println(format!(
                        "{} Interrupted after {} batch(es); {} in-flight lookup(s) discarded",
                        style("!").yellow(),
                        batches_completed,
                        abandoned
                    ));
                }
                PollEvent::Finished { phase } => {
                    let message = match phase {
                        SchedulerPhase::Done => "Done",
                        SchedulerPhase::Blocked => "Blocked",
                        SchedulerPhase::Draining => "Interrupted",
                        _ => "Stopped",
                    };
                    bar.set_message(message);
                }
            }
        }
        bar.finish_and_clear();
    })
}
