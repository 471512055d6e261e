//! Status classification.
//!
//! Maps extracted status pages onto [`CaseStatus`] and tells the failure
//! pages apart. The remote service answers both "no such case" and "you are
//! being refused" with the same generic error page, so the only way to detect
//! blocking is to look for secondary markers in the error text.
//!
//! Both the heading table and the marker table are plain data: new remote
//! wording is a one-line edit here.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::warn;

use crate::error::ExtractionError;
use crate::models::{CaseStatus, Identifier, LookupResult, StatusFields};
use crate::utils::Clock;

/// Exact status headings and the status each maps to.
pub static STATUS_TAXONOMY: &[(&str, CaseStatus)] = &[
    ("Case Was Received", CaseStatus::ReceiptNotice),
    ("Case Was Received and A Receipt Notice Was Sent", CaseStatus::ReceiptNotice),
    ("Fingerprint Fee Was Received", CaseStatus::ReceiptNotice),
    ("Case Was Updated To Show Fingerprints Were Taken", CaseStatus::BiometricsScheduled),
    ("Request to Reschedule My Appointment Was Received", CaseStatus::BiometricsScheduled),
    ("Biometrics Appointment Was Scheduled", CaseStatus::BiometricsScheduled),
    ("Case Was Approved", CaseStatus::DecisionMailed),
    ("Case Approval Was Certified By USCIS", CaseStatus::DecisionMailed),
    ("Decision Notice Mailed", CaseStatus::DecisionMailed),
    ("Request for Additional Evidence Was Sent", CaseStatus::EvidenceRequested),
    ("Request for Initial Evidence Was Sent", CaseStatus::EvidenceRequested),
    ("Response To USCIS' Request For Evidence Was Received", CaseStatus::EvidenceReceived),
    ("Correspondence Was Received And USCIS Is Reviewing It", CaseStatus::EvidenceReceived),
    ("New Card Is Being Produced", CaseStatus::CardIssued),
    ("Card Was Mailed To Me", CaseStatus::CardIssued),
    ("Card Was Picked Up By The United States Postal Service", CaseStatus::CardIssued),
    ("Card Was Delivered To Me By The Post Office", CaseStatus::CardDelivered),
    ("Interview Was Scheduled", CaseStatus::InterviewScheduled),
    ("Ready to Be Scheduled for An Interview", CaseStatus::InterviewScheduled),
    ("Withdrawal Acknowledgement Notice Was Sent", CaseStatus::Withdrawn),
    ("Notice Explaining USCIS Actions Was Mailed", CaseStatus::ExplanationSent),
    ("Case Was Suspended", CaseStatus::Suspended),
    ("Case Was Rejected Because It Was Improperly Filed", CaseStatus::Rejected),
    ("Case Rejected Because I Sent An Incorrect Fee", CaseStatus::Rejected),
    ("Case Was Denied", CaseStatus::Rejected),
];

/// What a failure page means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service is refusing all lookups.
    Blocked,
    /// This identifier does not exist.
    NotFound,
    /// No known marker; the page layout may have changed.
    Unknown,
}

/// Failure page markers, matched case-insensitively in table order.
pub static FAILURE_MARKERS: &[(&str, FailureKind)] = &[
    ("field violation", FailureKind::Blocked),
    ("validation error", FailureKind::NotFound),
];

/// Fixed format of the date leading the status text, after prefix removal.
pub const STATUS_DATE_FORMAT: &str = "%B %d %Y";

const DATE_PREFIXES: &[&str] = &["On ", "As of "];

/// Look up a heading in the taxonomy. Exact match only.
pub fn status_for_heading(heading: &str) -> Option<CaseStatus> {
    STATUS_TAXONOMY
        .iter()
        .find(|(text, _)| *text == heading)
        .map(|(_, status)| *status)
}

/// Classify a failure page by its markers.
pub fn failure_kind(document: &str) -> FailureKind {
    let lowered = document.to_lowercase();
    FAILURE_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, kind)| *kind)
        .unwrap_or(FailureKind::Unknown)
}

/// Parse the date leading the status text.
///
/// `"On January 3, 2023, we received..."` splits on commas into
/// `"On January 3"` and `" 2023"`, which join to `"On January 3 2023"`.
pub fn parse_leading_date(body: &str) -> Option<NaiveDate> {
    let mut parts = body.split(',');
    let day = parts.next()?.trim();
    let year = parts.next()?.trim();

    let day = DATE_PREFIXES
        .iter()
        .find_map(|prefix| day.strip_prefix(prefix))
        .unwrap_or(day);

    NaiveDate::parse_from_str(&format!("{} {}", day, year), STATUS_DATE_FORMAT).ok()
}

/// A failure page classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureClassification {
    pub kind: FailureKind,
    pub result: LookupResult,
}

/// Turns extracted fields and extraction failures into lookup results.
#[derive(Clone)]
pub struct StatusClassifier {
    clock: Arc<dyn Clock>,
}

impl StatusClassifier {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Classify a page that had a status heading.
    ///
    /// Unmapped headings become [`CaseStatus::UnknownStatus`] and are logged
    /// so the taxonomy can be extended.
    pub fn classify(&self, id: Identifier, fields: StatusFields) -> LookupResult {
        let status = status_for_heading(&fields.heading).unwrap_or_else(|| {
            warn!(
                "Unrecognised status heading for {}: {:?} (add it to the taxonomy)",
                id, fields.heading
            );
            CaseStatus::UnknownStatus
        });

        let occurred_at = parse_leading_date(&fields.body)
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .unwrap_or_else(|| self.clock.now());

        LookupResult {
            id,
            status,
            occurred_at,
            raw_heading: fields.heading,
            raw_text: fields.body,
        }
    }

    /// Classify a page that did not match the status layout.
    ///
    /// A blocked page yields a [`CaseStatus::NotFound`] placeholder; the
    /// caller is responsible for acting on [`FailureKind::Blocked`].
    pub fn classify_failure(&self, id: Identifier, error: &ExtractionError) -> FailureClassification {
        let kind = failure_kind(error.document());
        let status = match kind {
            FailureKind::Blocked | FailureKind::NotFound => CaseStatus::NotFound,
            FailureKind::Unknown => {
                warn!(
                    "Unrecognised failure page for {} ({}): {:?}",
                    id,
                    error,
                    truncate(error.document(), 200)
                );
                CaseStatus::UnknownStatus
            }
        };

        let mut result = LookupResult::failure(id, status, self.clock.now());
        result.raw_text = error.document().to_string();
        FailureClassification { kind, result }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
