//! HTTP transport for case status lookups.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::Transport;
use crate::config::Settings;
use crate::error::{PollError, TransportError};
use crate::models::Identifier;

/// Posts identifiers to the status endpoint as a form submission.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    form_field: String,
    request_delay: Duration,
}

impl HttpClient {
    /// Create a client from settings.
    pub fn new(settings: &Settings) -> Result<Self, PollError> {
        let user_agent = resolve_user_agent(settings.user_agent.as_deref());
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(settings.request_timeout())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            form_field: settings.form_field.clone(),
            request_delay: settings.request_delay(),
        })
    }

    /// Map a response status to a transport error, if it is one.
    fn check_status(status: StatusCode) -> Result<(), TransportError> {
        match status.as_u16() {
            429 => Err(TransportError::RateLimited(429)),
            _ if status.is_success() => Ok(()),
            code => Err(TransportError::Status(code)),
        }
    }

    async fn post(&self, id: &Identifier) -> Result<String, TransportError> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[(self.form_field.as_str(), id.as_str())])
            .send()
            .await?;

        let status = response.status();
        debug!(
            "POST {} for {} -> {} in {:?}",
            self.endpoint,
            id,
            status.as_u16(),
            start.elapsed()
        );
        Self::check_status(status)?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn submit(&self, id: &Identifier) -> Result<String, TransportError> {
        let result = self.post(id).await;

        // Per-lookup delay, applied whether or not the request succeeded
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        result
    }
}
