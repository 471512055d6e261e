//! Single-identifier lookups.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::classifier::{FailureKind, StatusClassifier};
use crate::error::TransportError;
use crate::models::{CaseStatus, Identifier, LookupResult};
use crate::scrapers::{Extractor, Transport};

/// Process-wide "upstream is refusing us" flag.
///
/// Written by any lookup that detects blocking, read by the scheduler
/// between batches.
#[derive(Debug, Clone, Default)]
pub struct BlockSignal(Arc<AtomicBool>);

impl BlockSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Looks up one identifier at a time. Never fails: every outcome becomes a
/// [`LookupResult`].
pub struct CasePoller {
    transport: Arc<dyn Transport>,
    extractor: Arc<dyn Extractor>,
    classifier: StatusClassifier,
    blocked: BlockSignal,
}

impl CasePoller {
    pub fn new(
        transport: Arc<dyn Transport>,
        extractor: Arc<dyn Extractor>,
        classifier: StatusClassifier,
        blocked: BlockSignal,
    ) -> Self {
        Self {
            transport,
            extractor,
            classifier,
            blocked,
        }
    }

    pub fn block_signal(&self) -> &BlockSignal {
        &self.blocked
    }

    pub async fn lookup(&self, id: Identifier) -> LookupResult {
        let raw = match self.transport.submit(&id).await {
            Ok(raw) => raw,
            Err(TransportError::RateLimited(code)) => {
                warn!("Lookup for {} was rate limited (HTTP {})", id, code);
                self.blocked.raise();
                return LookupResult::failure(id, CaseStatus::NotFound, self.classifier.now());
            }
            Err(e) => {
                debug!("Transport failure for {}: {}", id, e);
                return LookupResult::failure(
                    id,
                    CaseStatus::TransportFailed,
                    self.classifier.now(),
                );
            }
        };

        match self.extractor.extract(&raw) {
            Ok(fields) => self.classifier.classify(id, fields),
            Err(e) => {
                let classified = self.classifier.classify_failure(id, &e);
                if classified.kind == FailureKind::Blocked {
                    warn!(
                        "Remote service is rejecting requests (detected on {})",
                        classified.result.id
                    );
                    self.blocked.raise();
                }
                classified.result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::error::ExtractionError;
    use crate::models::StatusFields;
    use crate::utils::FixedClock;

    /// Replies with a canned outcome chosen by the identifier's last digit.
    struct ScriptedTransport;

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn submit(&self, id: &Identifier) -> Result<String, TransportError> {
            match id.as_str().chars().last() {
                Some('0') => Err(TransportError::Status(502)),
                Some('1') => Err(TransportError::RateLimited(429)),
                Some('2') => Ok("blocked".to_string()),
                Some('3') => Ok("missing".to_string()),
                Some('4') => Ok("garbled".to_string()),
                _ => Ok("ok".to_string()),
            }
        }
    }

    struct ScriptedExtractor;

    impl Extractor for ScriptedExtractor {
        fn extract(&self, raw: &str) -> Result<StatusFields, ExtractionError> {
            let document = match raw {
                "ok" => {
                    return Ok(StatusFields::new(
                        "Case Was Received",
                        "On May 2, 2023, we received your case.",
                    ))
                }
                "blocked" => "Field Violation",
                "missing" => "Validation Error(s)",
                _ => "something else entirely",
            };
            Err(ExtractionError::MissingContainer {
                document: document.to_string(),
            })
        }
    }

    fn poller() -> CasePoller {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        CasePoller::new(
            Arc::new(ScriptedTransport),
            Arc::new(ScriptedExtractor),
            StatusClassifier::new(Arc::new(clock)),
            BlockSignal::new(),
        )
    }

    #[tokio::test]
    async fn test_transport_failure_is_absorbed() {
        let poller = poller();
        let result = poller.lookup(Identifier::from("IOE0")).await;
        assert_eq!(result.status, CaseStatus::TransportFailed);
        assert!(result.raw_heading.is_empty());
        assert!(result.raw_text.is_empty());
        assert!(!poller.block_signal().is_raised());
    }

    #[tokio::test]
    async fn test_rate_limit_raises_block_signal() {
        let poller = poller();
        let result = poller.lookup(Identifier::from("IOE1")).await;
        assert_eq!(result.status, CaseStatus::NotFound);
        assert!(poller.block_signal().is_raised());
    }

    #[tokio::test]
    async fn test_field_violation_raises_block_signal() {
        let poller = poller();
        let result = poller.lookup(Identifier::from("IOE2")).await;
        assert_eq!(result.status, CaseStatus::NotFound);
        assert!(poller.block_signal().is_raised());
    }

    #[tokio::test]
    async fn test_not_found_and_unknown_failures() {
        let poller = poller();
        let missing = poller.lookup(Identifier::from("IOE3")).await;
        assert_eq!(missing.status, CaseStatus::NotFound);
        let unknown = poller.lookup(Identifier::from("IOE4")).await;
        assert_eq!(unknown.status, CaseStatus::UnknownStatus);
        assert!(!poller.block_signal().is_raised());
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let result = poller().lookup(Identifier::from("IOE5")).await;
        assert_eq!(result.id.as_str(), "IOE5");
        assert_eq!(result.status, CaseStatus::ReceiptNotice);
        assert_eq!(
            result.occurred_at,
            Utc.with_ymd_and_hms(2023, 5, 2, 0, 0, 0).unwrap()
        );
    }
}
