//! Route handlers.
//!
//! Each handler is a single linear mapping: parse, translate, call upstream,
//! relay. The chat handler has one branch, streamed or buffered.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::RelayError;
use crate::http::request::RequestIdExt;
use crate::http::response::event_stream;
use crate::http::server::AppState;
use crate::translate::{
    InboundChatRequest, LegacyCompletionRequest, OutboundChatRequest, OutboundCompletionRequest,
};
use crate::upstream::UpstreamReply;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub message: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub chat: &'static str,
    pub models: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// `GET /`
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "ok",
        message: "NVIDIA NIM to OpenAI Proxy is running",
        endpoints: Endpoints {
            chat: "/v1/chat/completions",
            models: "/v1/models",
        },
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// `GET /v1/models`
///
/// Any upstream failure collapses into the fixed models error; the cause is
/// only logged.
pub async fn list_models(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<UpstreamReply, RelayError> {
    let request_id = headers.request_id();

    state.upstream.list_models(request_id).await.map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "Error fetching models");
        RelayError::ModelsUnavailable
    })
}

/// `POST /v1/chat/completions`
///
/// The credential check comes before the body is even read, so a missing
/// key is reported regardless of what the caller sent, oversized bodies
/// included.
pub async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, RelayError> {
    if !state.upstream.has_credential() {
        return Err(RelayError::MissingCredential);
    }

    let request_id = headers.request_id();
    let inbound: InboundChatRequest = serde_json::from_slice(&body?)?;
    let outbound = OutboundChatRequest::from_inbound(inbound, &state.defaults);

    tracing::debug!(
        request_id = %request_id,
        model = %outbound.model,
        stream = outbound.stream,
        body = %serde_json::to_string(&outbound).unwrap_or_default(),
        "Sending request upstream"
    );

    if outbound.stream {
        let upstream = state
            .upstream
            .chat_completion_stream(&outbound, request_id)
            .await?;
        Ok(event_stream(upstream, request_id))
    } else {
        let reply = state.upstream.chat_completion(&outbound, request_id).await?;
        Ok(reply.into_response())
    }
}

/// `POST /v1/completions`
///
/// Legacy text completion, relayed through the chat endpoint without
/// streaming.
pub async fn completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<UpstreamReply, RelayError> {
    let request_id = headers.request_id();
    let legacy: LegacyCompletionRequest = serde_json::from_slice(&body?)?;
    let outbound = OutboundCompletionRequest::from_legacy(legacy, &state.defaults);

    tracing::debug!(
        request_id = %request_id,
        model = %outbound.model,
        "Sending legacy completion upstream"
    );

    state.upstream.chat_completion(&outbound, request_id).await
}
