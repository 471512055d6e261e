//! Case status taxonomy.

use std::fmt;

/// Closed set of statuses a lookup can resolve to.
///
/// Declaration order is the tie-break order used when two buckets share a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaseStatus {
    BiometricsScheduled,
    ReceiptNotice,
    DecisionMailed,
    EvidenceRequested,
    EvidenceReceived,
    CardIssued,
    CardDelivered,
    InterviewScheduled,
    Withdrawn,
    ExplanationSent,
    Suspended,
    Rejected,
    UnknownStatus,
    NotFound,
    TransportFailed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 15] = [
        Self::BiometricsScheduled,
        Self::ReceiptNotice,
        Self::DecisionMailed,
        Self::EvidenceRequested,
        Self::EvidenceReceived,
        Self::CardIssued,
        Self::CardDelivered,
        Self::InterviewScheduled,
        Self::Withdrawn,
        Self::ExplanationSent,
        Self::Suspended,
        Self::Rejected,
        Self::UnknownStatus,
        Self::NotFound,
        Self::TransportFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BiometricsScheduled => "BIOMETRICS_SCHEDULED",
            Self::ReceiptNotice => "RECEIPT_NOTICE",
            Self::DecisionMailed => "DECISION_MAILED",
            Self::EvidenceRequested => "EVIDENCE_REQUESTED",
            Self::EvidenceReceived => "EVIDENCE_RECEIVED",
            Self::CardIssued => "CARD_ISSUED",
            Self::CardDelivered => "CARD_DELIVERED",
            Self::InterviewScheduled => "INTERVIEW_SCHEDULED",
            Self::Withdrawn => "WITHDRAWN",
            Self::ExplanationSent => "EXPLANATION_SENT",
            Self::Suspended => "SUSPENDED",
            Self::Rejected => "REJECTED",
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::NotFound => "NOT_FOUND",
            Self::TransportFailed => "TRANSPORT_FAILED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the lookup reached a recognised case page.
    pub fn is_case_status(&self) -> bool {
        !matches!(
            self,
            Self::UnknownStatus | Self::NotFound | Self::TransportFailed
        )
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
