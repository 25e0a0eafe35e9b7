//! HTTP client for the Portal
//!
//! A thin authenticated wrapper over `reqwest`. It never interprets status
//! codes itself: every response comes back as a [`PortalResponse`] and the
//! caller decides which statuses are tolerated.

use crate::api::types::{first_graph_record, Record};
use crate::config::{Config, Credentials};
use crate::error::{ClientError, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A Portal response with its body already parsed
#[derive(Debug, Clone)]
pub struct PortalResponse {
    pub method: &'static str,
    pub url: String,
    pub status: StatusCode,
    /// Parsed JSON body; a non-JSON body is kept as a string, an empty one is `Null`
    pub body: Value,
}

impl PortalResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Error describing this response's status
    pub fn status_error(&self) -> ClientError {
        ClientError::Status {
            method: self.method,
            url: self.url.clone(),
            status: self.status.as_u16(),
        }
    }

    /// The body as a record (lookup responses)
    pub fn record(&self) -> Result<Record> {
        self.body
            .as_object()
            .cloned()
            .ok_or_else(|| ClientError::unexpected_response(&self.url, "body is not a JSON object"))
    }

    /// The single record nested under `@graph` (create and update responses)
    pub fn graph_record(&self) -> Result<Record> {
        first_graph_record(&self.body)
            .ok_or_else(|| ClientError::unexpected_response(&self.url, "no record under '@graph'"))
    }
}

/// Authenticated Portal client
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.credentials.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub async fn get(&self, url: &str) -> Result<PortalResponse> {
        self.execute("GET", self.client.get(url), url).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<PortalResponse> {
        self.execute("POST", self.client.post(url).json(body), url).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<PortalResponse> {
        self.execute("PATCH", self.client.patch(url).json(body), url).await
    }

    async fn execute(
        &self,
        method: &'static str,
        request: RequestBuilder,
        url: &str,
    ) -> Result<PortalResponse> {
        let response = request
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.secret_key))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        debug!(method, url, status = status.as_u16(), "Portal response");

        Ok(PortalResponse {
            method,
            url: url.to_string(),
            status,
            body,
        })
    }
}
