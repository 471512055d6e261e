//! casepoll - batched case status poller.
//!
//! Polls a dense range of case identifiers against a remote status page in
//! fixed-size concurrent batches, classifies each page into a closed status
//! taxonomy, and reports the collected results grouped by day and status.
//! Runs stop early when the remote service starts refusing lookups and flush
//! everything collected so far when interrupted.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod utils;

pub use config::{PollParams, Settings};
pub use error::{ExtractionError, PollError, TransportError};
