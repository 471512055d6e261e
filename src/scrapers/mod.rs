//! Remote capabilities: submitting lookups and extracting status pages.

mod extract;
mod http_client;

pub use extract::HtmlExtractor;
pub use http_client::{resolve_user_agent, HttpClient, USER_AGENT};

use async_trait::async_trait;

use crate::error::{ExtractionError, TransportError};
use crate::models::{Identifier, StatusFields};

/// Submits one identifier to the status endpoint and returns the raw body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, id: &Identifier) -> Result<String, TransportError>;
}

/// Pulls the status fields out of a raw response body.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<StatusFields, ExtractionError>;
}
