//! Per-identifier lookup records.

use chrono::{DateTime, Utc};

use super::{CaseStatus, Identifier};

/// Fields extracted from a case status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFields {
    pub heading: String,
    pub body: String,
}

impl StatusFields {
    pub fn new(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
        }
    }
}

/// The outcome of looking up one identifier. Created once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult {
    pub id: Identifier,
    pub status: CaseStatus,
    /// Parsed from the case page, or the lookup time when that fails.
    pub occurred_at: DateTime<Utc>,
    pub raw_heading: String,
    pub raw_text: String,
}

impl LookupResult {
    /// Record for a lookup that never produced a case page.
    pub fn failure(id: Identifier, status: CaseStatus, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status,
            occurred_at: now,
            raw_heading: String::new(),
            raw_text: String::new(),
        }
    }
}
