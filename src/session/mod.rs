//! One authenticated flow against the game
//!
//! A `Session` exclusively owns its transport: every request goes through
//! `&mut self`, so two requests can never be in flight for the same account.
//! After each round-trip the session sleeps the configured request delay,
//! which keeps us inside the service's implicit rate tolerance.

pub mod routes;

use crate::core::config::PacingConfig;
use crate::core::error::Result;
use crate::extract::{HtmlPages, PageExtractor};
use crate::transport::{Fields, Transport};

/// Paced access to the game for a single account
pub struct Session<T, P = HtmlPages> {
    transport: T,
    pages: P,
    pacing: PacingConfig,
    requests: u64,
    login: Option<String>,
}

impl<T: Transport, P: PageExtractor> Session<T, P> {
    pub fn new(transport: T, pages: P, pacing: PacingConfig) -> Self {
        Self {
            transport,
            pages,
            pacing,
            requests: 0,
            login: None,
        }
    }

    pub fn pages(&self) -> &P {
        &self.pages
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn pacing(&self) -> &PacingConfig {
        &self.pacing
    }

    /// Round-trips issued so far
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Login of the connected account, if any
    pub fn login_name(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Fetch a page, then wait out the request delay
    pub async fn get(&mut self, path: &str, params: &Fields<'_>) -> Result<String> {
        self.requests += 1;
        let result = self.transport.fetch(path, params).await;
        self.pause().await;
        result
    }

    /// Submit a form, then wait out the request delay
    pub async fn post(&mut self, path: &str, form: &Fields<'_>) -> Result<String> {
        self.requests += 1;
        let result = self.transport.submit(path, form).await;
        self.pause().await;
        result
    }

    async fn pause(&self) {
        let delay = self.pacing.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Connect with the given credentials
    ///
    /// # Returns
    /// Whether the game confirmed the connection
    pub async fn login(&mut self, login: &str, password: &str) -> Result<bool> {
        let form = [
            ("pseudo", login.to_string()),
            ("mdp", password.to_string()),
            ("action", "identification".to_string()),
            ("identification", "identification".to_string()),
        ];
        let body = self.post(routes::LOGIN, &form).await?;

        let connected = self.pages.login_succeeded(&body);
        if connected {
            tracing::debug!("Connected to {}", login);
            self.login = Some(login.to_string());
        } else {
            tracing::warn!("Could not connect to {}", login);
        }
        Ok(connected)
    }

    /// End the session on the server side
    pub async fn logout(&mut self) -> Result<bool> {
        let body = self.get(routes::LOGOUT, &[]).await?;

        let disconnected = self.pages.logout_succeeded(&body);
        if disconnected {
            tracing::debug!("Disconnected {}", self.login.as_deref().unwrap_or("session"));
            self.login = None;
        } else {
            tracing::warn!("Could not disconnect");
        }
        Ok(disconnected)
    }
}
