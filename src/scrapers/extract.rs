//! Status page extraction.
//!
//! Resolves the configured selectors against a response document and
//! returns the status heading and text. Documents without the status
//! container come back as an [`ExtractionError`] carrying the page's
//! error region so the classifier can tell the failure kinds apart.

use scraper::{ElementRef, Html, Selector};

use super::Extractor;
use crate::config::SelectorConfig;
use crate::error::{ExtractionError, PollError};
use crate::models::StatusFields;

/// Selector-driven extractor for status pages.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    container: Selector,
    heading: Selector,
    body: Selector,
    error: Selector,
}

fn compile(selector: &str) -> Result<Selector, PollError> {
    Selector::parse(selector).map_err(|e| PollError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Collect an element's text with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

impl HtmlExtractor {
    pub fn new(config: &SelectorConfig) -> Result<Self, PollError> {
        Ok(Self {
            container: compile(&config.container)?,
            heading: compile(&config.heading)?,
            body: compile(&config.body)?,
            error: compile(&config.error)?,
        })
    }

    /// Text of the error region, or of the whole document when absent.
    fn failure_document(&self, document: &Html) -> String {
        document
            .select(&self.error)
            .next()
            .map(element_text)
            .unwrap_or_else(|| element_text(document.root_element()))
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, raw: &str) -> Result<StatusFields, ExtractionError> {
        let document = Html::parse_document(raw);

        let Some(container) = document.select(&self.container).next() else {
            return Err(ExtractionError::MissingContainer {
                document: self.failure_document(&document),
            });
        };

        let heading = container
            .select(&self.heading)
            .next()
            .map(element_text)
            .filter(|h| !h.is_empty());
        let Some(heading) = heading else {
            return Err(ExtractionError::MissingHeading {
                document: self.failure_document(&document),
            });
        };

        let body = container
            .select(&self.body)
            .next()
            .map(element_text)
            .unwrap_or_default();

        Ok(StatusFields { heading, body })
    }
}
