//! Configuration for casepoll.
//!
//! [`Settings`] covers how lookups are made and where exports go. It is read
//! from an optional TOML file and then overridden from the command line (and
//! the `CASEPOLL_*` environment variables clap maps onto it). [`PollParams`]
//! is the per-invocation range and batch width.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::PollError;
use crate::models::{IdentifierRange, DEFAULT_ID_WIDTH};

/// Default case status endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://egov.uscis.gov/casestatus/mycasestatus.do";

/// Default form field carrying the identifier.
pub const DEFAULT_FORM_FIELD: &str = "appReceiptNum";

/// Default raw results export.
pub const DEFAULT_RAW_OUTPUT: &str = "raw_results.csv";

/// Default number of lookups per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// CSS selectors resolved against a status page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Element wrapping the status heading and text.
    pub container: String,
    /// Status heading, relative to the container.
    pub heading: String,
    /// Status text, relative to the container.
    pub body: String,
    /// Error region shown instead of the container on failures.
    pub error: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "div.rows.text-center".to_string(),
            heading: "h1".to_string(),
            body: "p".to_string(),
            error: "#formErrorMessages".to_string(),
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Status endpoint the identifier is posted to.
    pub endpoint: String,
    /// Name of the form field carrying the identifier.
    pub form_field: String,
    /// None: crate user agent, "impersonate": browser user agent, else verbatim.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Delay after each lookup in milliseconds.
    pub request_delay_ms: u64,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Digits after the identifier prefix.
    pub id_width: usize,
    /// Where the per-case export is written.
    pub raw_output: PathBuf,
    pub selectors: SelectorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            form_field: DEFAULT_FORM_FIELD.to_string(),
            user_agent: None,
            request_timeout_secs: 30,
            request_delay_ms: 0,
            accept_invalid_certs: false,
            id_width: DEFAULT_ID_WIDTH,
            raw_output: PathBuf::from(DEFAULT_RAW_OUTPUT),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, PollError> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    PollError::Config(format!("failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, PollError> {
        toml::from_str(content).map_err(|e| PollError::Config(e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Parameters of a single polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollParams {
    pub prefix: String,
    pub start: i64,
    pub count: i64,
    pub batch_size: i64,
    /// Grouped export path; the grouped export is skipped when unset.
    pub output: Option<PathBuf>,
}

impl PollParams {
    /// Check the parameters before any network activity.
    ///
    /// Returns the identifier range and the batch width.
    pub fn validate(&self, id_width: usize) -> Result<(IdentifierRange, usize), PollError> {
        if self.batch_size <= 0 {
            return Err(PollError::InvalidRange(format!(
                "batch size must be positive, got {}",
                self.batch_size
            )));
        }
        let range = IdentifierRange::new(&self.prefix, self.start, self.count, id_width)?;
        Ok((range, self.batch_size as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: i64, count: i64, batch_size: i64) -> PollParams {
        PollParams {
            prefix: "IOE".to_string(),
            start,
            count,
            batch_size,
            output: None,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.form_field, "appReceiptNum");
        assert_eq!(settings.id_width, 10);
        assert_eq!(settings.request_delay(), Duration::ZERO);
        assert!(!settings.accept_invalid_certs);
    }

    #[test]
    fn test_from_toml_overrides_some_keys() {
        let settings = Settings::from_toml(
            r#"
            request_delay_ms = 250
            accept_invalid_certs = true
            raw_output = "out/raw.csv"

            [selectors]
            heading = "h2"
            "#,
        )
        .unwrap();

        assert_eq!(settings.request_delay(), Duration::from_millis(250));
        assert!(settings.accept_invalid_certs);
        assert_eq!(settings.raw_output, PathBuf::from("out/raw.csv"));
        assert_eq!(settings.selectors.heading, "h2");
        assert_eq!(settings.selectors.container, "div.rows.text-center");
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = Settings::from_toml("request_delay_ms = \"slow\"").unwrap_err();
        assert!(matches!(err, PollError::Config(_)));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.raw_output, PathBuf::from(DEFAULT_RAW_OUTPUT));
    }

    #[test]
    fn test_validate_params() {
        let (range, batch) = params(900677923, 3, 3).validate(10).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(batch, 3);

        assert!(params(1, 0, 3).validate(10).is_err());
        assert!(params(-5, 3, 3).validate(10).is_err());
        assert!(params(1, 3, 0).validate(10).is_err());
    }
}
