//! Batch scheduling.
//!
//! Identifiers are polled in fixed-size batches. Every lookup in a batch is
//! in flight at once; the next batch starts only after the whole previous
//! batch has resolved, so at most one batch width of requests is ever
//! outstanding. Results and the cursor are only updated once a batch is
//! complete.
//!
//! Between batches the scheduler checks, in order: cancellation, the block
//! signal, and cursor exhaustion. A cancellation that arrives while a batch
//! is in flight abandons that batch: its lookups are dropped and none of its
//! results are kept, so a flush always covers whole batches.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::poller::{BlockSignal, CasePoller};
use crate::models::{IdentifierRange, LookupResult};

/// Scheduler lifecycle.
///
/// `Idle -> Running -> (Draining | Done | Blocked) -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Running,
    /// Interrupted; preserving what was collected.
    Draining,
    /// Every identifier was polled.
    Done,
    /// The remote service started refusing lookups.
    Blocked,
    Terminated,
}

impl SchedulerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Blocked => "blocked",
            Self::Terminated => "terminated",
        }
    }
}

/// Everything collected during one invocation.
///
/// Only the scheduler appends results and moves the cursor. The block signal
/// is shared with the case poller, which may raise it mid-batch.
#[derive(Debug, Default)]
pub struct RunState {
    results: Vec<LookupResult>,
    cursor: usize,
    blocked: BlockSignal,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal to hand to the case poller.
    pub fn block_signal(&self) -> BlockSignal {
        self.blocked.clone()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.is_raised()
    }

    /// Offset of the next identifier to poll.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn results(&self) -> &[LookupResult] {
        &self.results
    }

    fn append_batch(&mut self, batch: Vec<LookupResult>, advanced: usize) {
        self.results.extend(batch);
        self.cursor += advanced;
    }
}

/// Progress events emitted while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    BatchStarted {
        index: usize,
        size: usize,
    },
    BatchCompleted {
        index: usize,
        size: usize,
        polled: usize,
        total: usize,
    },
    Blocked {
        batches_completed: usize,
    },
    Interrupted {
        batches_completed: usize,
        abandoned: usize,
    },
    Finished {
        phase: SchedulerPhase,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// `Done`, `Blocked` or `Draining`.
    pub phase: SchedulerPhase,
    pub batches_completed: usize,
    pub lookups: usize,
}

/// Runs batches of lookups one after another.
pub struct BatchScheduler {
    poller: Arc<CasePoller>,
    batch_size: usize,
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<PollEvent>>,
    phase: SchedulerPhase,
}

impl BatchScheduler {
    /// `batch_size` is clamped to at least one.
    pub fn new(poller: Arc<CasePoller>, batch_size: usize, cancel: CancellationToken) -> Self {
        Self {
            poller,
            batch_size: batch_size.max(1),
            cancel,
            events: None,
            phase: SchedulerPhase::Idle,
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<PollEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    fn emit(&self, event: PollEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn transition(&mut self, next: SchedulerPhase) {
        debug!(
            "Scheduler {} -> {}",
            self.phase.as_str(),
            next.as_str()
        );
        self.phase = next;
    }

    /// Poll `ids` from `state`'s cursor until exhausted, blocked or cancelled.
    pub async fn run(&mut self, ids: &IdentifierRange, state: &mut RunState) -> RunOutcome {
        self.transition(SchedulerPhase::Running);

        let mut batches_completed = 0usize;
        let terminal = loop {
            if self.cancel.is_cancelled() {
                self.emit(PollEvent::Interrupted {
                    batches_completed,
                    abandoned: 0,
                });
                break SchedulerPhase::Draining;
            }
            if state.is_blocked() {
                warn!(
                    "Stopping after {} batches: remote service is blocking lookups",
                    batches_completed
                );
                self.emit(PollEvent::Blocked { batches_completed });
                break SchedulerPhase::Blocked;
            }
            if state.cursor() >= ids.len() {
                break SchedulerPhase::Done;
            }

            let batch = ids.slice(state.cursor(), self.batch_size);
            let size = batch.len();
            self.emit(PollEvent::BatchStarted {
                index: batches_completed,
                size,
            });

            let poller = Arc::clone(&self.poller);
            let cancel = self.cancel.clone();
            let in_flight: FuturesUnordered<_> =
                batch.into_iter().map(|id| poller.lookup(id)).collect();

            // Completion order within the batch; whole batch or nothing
            let completed = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                results = in_flight.collect::<Vec<_>>() => Some(results),
            };

            let Some(results) = completed else {
                warn!(
                    "Interrupted with batch {} in flight; abandoning {} lookups",
                    batches_completed + 1,
                    size
                );
                self.emit(PollEvent::Interrupted {
                    batches_completed,
                    abandoned: size,
                });
                break SchedulerPhase::Draining;
            };

            state.append_batch(results, size);
            batches_completed += 1;
            info!(
                "Batch {} complete: {}/{} identifiers polled",
                batches_completed,
                state.cursor(),
                ids.len()
            );
            self.emit(PollEvent::BatchCompleted {
                index: batches_completed - 1,
                size,
                polled: state.cursor(),
                total: ids.len(),
            });
        };

        self.transition(terminal);
        self.emit(PollEvent::Finished { phase: terminal });
        self.transition(SchedulerPhase::Terminated);

        RunOutcome {
            phase: terminal,
            batches_completed,
            lookups: state.results().len(),
        }
    }
}
