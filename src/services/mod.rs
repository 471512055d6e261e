//! Polling pipeline: classify, look up, schedule, aggregate, report.

pub mod aggregate;
pub mod classifier;
pub mod poller;
pub mod report;
pub mod scheduler;

pub use aggregate::{group, Aggregation, Bucket, BucketKey};
pub use classifier::{FailureKind, StatusClassifier};
pub use poller::{BlockSignal, CasePoller};
pub use report::{ReportOutcome, Reporter};
pub use scheduler::{BatchScheduler, PollEvent, RunOutcome, RunState, SchedulerPhase};
