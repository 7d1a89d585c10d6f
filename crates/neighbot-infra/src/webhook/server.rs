//! Inbound HTTP side of the webhook bridge.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use neighbot_core::conversation::{InboundMessage, ReplyHandler, TurnOutcome};

use super::transport::WebhookTransport;

#[derive(Clone)]
pub(crate) struct ServerState {
    pub handler: ReplyHandler,
    pub transport: Arc<WebhookTransport>,
    pub token: Arc<str>,
}

/// Inbound request rejection.
#[derive(Debug)]
pub(crate) enum Rejection {
    Unauthorized(&'static str),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Rejection::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/messages", post(receive_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn authorize(headers: &HeaderMap, token: &str) -> Result<(), Rejection> {
    let auth = headers
        .get("authorization")
        .ok_or(Rejection::Unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Rejection::Unauthorized("invalid Authorization header encoding"))?;
    match auth.strip_prefix("Bearer ") {
        Some(given) if given.trim() == token => Ok(()),
        _ => Err(Rejection::Unauthorized("invalid bearer token")),
    }
}

/// POST /messages - handle one chat message from the bridge.
async fn receive_message(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(message): Json<InboundMessage>,
) -> Result<Json<TurnOutcome>, Rejection> {
    authorize(&headers, &state.token)?;
    let outcome = state.handler.handle(&*state.transport, message).await;
    tracing::debug!(adapter = %state.handler.adapter(), ?outcome, "inbound message handled");
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authorize() {
        assert!(authorize(&headers("Bearer s3cret"), "s3cret").is_ok());
        assert!(authorize(&headers("Bearer wrong"), "s3cret").is_err());
        assert!(authorize(&headers("s3cret"), "s3cret").is_err());
        assert!(authorize(&HeaderMap::new(), "s3cret").is_err());
    }
}
