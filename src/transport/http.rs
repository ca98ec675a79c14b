//! Cookie-holding HTTP transport
//!
//! A thin `reqwest` wrapper: joins paths onto the configured base URL, keeps
//! the session cookie between calls and maps every failure to `Transient`.

use crate::core::config::SiteConfig;
use crate::core::error::{PilotError, Result};
use crate::transport::{Fields, Transport};
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP transport bound to one game site and one cookie jar
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with its own cookie store
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(site.user_agent.clone())
            .timeout(Duration::from_secs(site.timeout_secs))
            .build()
            .map_err(|e| PilotError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: site.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn body(response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(PilotError::Transient(format!(
                "{} answered {}",
                response.url(),
                status
            )));
        }
        // Decoding failures happen now and then on this site; they are
        // transient like any other hiccup.
        response
            .text()
            .await
            .map_err(|e| PilotError::Transient(e.to_string()))
    }
}

impl Transport for HttpTransport {
    async fn fetch(&mut self, path: &str, params: &Fields<'_>) -> Result<String> {
        let url = self.url(path);
        tracing::trace!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| PilotError::Transient(e.to_string()))?;

        Self::body(response).await
    }

    async fn submit(&mut self, path: &str, form: &Fields<'_>) -> Result<String> {
        let url = self.url(path);
        tracing::trace!("POST {} ({} fields)", url, form.len());

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| PilotError::Transient(e.to_string()))?;

        Self::body(response).await
    }
}
