//! Command-line interface for casepoll.

mod commands;
pub mod interrupt;
pub mod progress;

pub use commands::{is_verbose, run};
