//! Shared utilities.
//!
//! - `clock`: injectable wall clock
//! - `format`: human-readable console formatting

mod clock;
mod format;

pub use clock::{Clock, FixedClock, SystemClock};
pub use format::{format_duration, plural};
