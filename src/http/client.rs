use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use tokio::sync::watch;

use crate::config::ApiSettings;
use crate::domain::SessionToken;
use crate::errors::{GatewayError, GatewayResult};

/// Abort signal shared by every request started for one view
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }

    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut rx = self.signal.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client bound to the club API base URL
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = Self::build_client(&settings.user_agent, settings.timeout_secs)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&SessionToken>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Send the request unless `cancel` fires first
    pub async fn send(&self, request: RequestBuilder, cancel: &CancelHandle) -> GatewayResult<Response> {
        if cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = request.send() => result.map_err(map_transport_error),
        }
    }

    /// Read the body as text under the same cancel handle
    pub async fn read_text(&self, response: Response, cancel: &CancelHandle) -> GatewayResult<String> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GatewayError::Cancelled),
            result = response.text() => result.map_err(map_transport_error),
        }
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::network("Request timed out")
    } else {
        GatewayError::from(err)
    }
}
