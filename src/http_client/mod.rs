//! HTTP client for the archive index and snapshot services.

mod user_agent;

pub use user_agent::{UserAgent, DEFAULT_USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::WaybackError;

/// Text response from a GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Thin wrapper around `reqwest::Client` with request logging.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// `user_agent` is the raw setting; see [`UserAgent::from_setting`].
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, WaybackError> {
        let agent = UserAgent::from_setting(user_agent);
        let client = Client::builder()
            .user_agent(agent.header_value())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| WaybackError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// GET a URL and read the body as text. Non-2xx statuses are not errors.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        self.get_with_timeout(url, self.timeout).await
    }

    /// GET with a per-request timeout overriding the client default.
    pub async fn get_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(
            "GET {} -> {} ({} bytes, {} ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse { status, body })
    }
}
