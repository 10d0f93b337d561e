//! Credentialed HTTP client for the upstream provider.
//!
//! # Responsibilities
//! - Build endpoint URLs from the configured base URL
//! - Attach the bearer credential and correlation headers
//! - Turn non-2xx replies into `RelayError::Upstream` with the provider's message
//!
//! Nothing here retries or applies timeouts; a failed call fails the request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use url::{Host, Url};

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::http::request::X_REQUEST_ID;

/// A buffered upstream reply: status plus parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Client for the upstream OpenAI-compatible API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Create a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("nim-relay/", env!("CARGO_PKG_VERSION")));
        if is_loopback(&config.base_url) {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.credential().map(str::to_string),
        })
    }

    /// Whether a bearer credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn prepare(&self, builder: reqwest::RequestBuilder, request_id: &str) -> reqwest::RequestBuilder {
        let builder = builder.header(X_REQUEST_ID.as_str(), request_id);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// `GET {base}/models`.
    pub async fn list_models(&self, request_id: &str) -> Result<UpstreamReply, RelayError> {
        let response = self
            .prepare(self.http.get(self.endpoint("models")), request_id)
            .send()
            .await?;

        read_json(check_status(response).await?).await
    }

    /// Buffered `POST {base}/chat/completions`.
    pub async fn chat_completion<T>(&self, body: &T, request_id: &str) -> Result<UpstreamReply, RelayError>
    where
        T: Serialize + ?Sized,
    {
        let response = self.send_chat(body, request_id).await?;
        read_json(response).await
    }

    /// Streaming `POST {base}/chat/completions`.
    ///
    /// Returns as soon as the upstream status line and headers arrive; the
    /// body is left unread for the caller to relay.
    pub async fn chat_completion_stream<T>(
        &self,
        body: &T,
        request_id: &str,
    ) -> Result<reqwest::Response, RelayError>
    where
        T: Serialize + ?Sized,
    {
        self.send_chat(body, request_id).await
    }

    async fn send_chat<T>(&self, body: &T, request_id: &str) -> Result<reqwest::Response, RelayError>
    where
        T: Serialize + ?Sized,
    {
        let response = self
            .prepare(self.http.post(self.endpoint("chat/completions")), request_id)
            .json(body)
            .send()
            .await?;

        check_status(response).await
    }
}

/// Pass 2xx responses through; convert anything else into an upstream error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RelayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| format!("upstream request failed with status code {}", status.as_u16()));

    Err(RelayError::Upstream {
        status: Some(status),
        message,
    })
}

async fn read_json(response: reqwest::Response) -> Result<UpstreamReply, RelayError> {
    let status = response.status();
    let body = response.json::<Value>().await.map_err(|e| RelayError::Upstream {
        status: None,
        message: e.to_string(),
    })?;

    Ok(UpstreamReply { status, body })
}

/// Loopback upstreams (sidecars, local NIM containers) bypass any system proxy.
fn is_loopback(base_url: &str) -> bool {
    match Url::parse(base_url).ok().and_then(|url| url.host().map(|h| h.to_owned())) {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Extract `error.message` from an upstream error body, if there is one.
fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
