//! Framework adapter handlers.
//!
//! The body is taken as raw `Bytes` and decoded with the same
//! `MetricsRequest::from_slice` the raw adapter uses, so both front ends
//! accept and reject exactly the same inputs regardless of `Content-Type`.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use latscope_core::error::LatscopeError;
use latscope_core::protocol::ErrorBody;
use latscope_core::{MetricsRequest, RegionMetrics};

use crate::app_state::AppState;

/// `LatscopeError` rendered as `{"error": ..., "code": ...}`.
#[derive(Debug)]
pub struct ApiError(pub LatscopeError);

impl From<LatscopeError> for ApiError {
    fn from(e: LatscopeError) -> Self {
        Self(e)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(r: BytesRejection) -> Self {
        if r.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self(LatscopeError::PayloadTooLarge)
        } else {
            Self(LatscopeError::BadRequest(r.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::debug!(%status, error = %self.0, "request rejected");
        (status, Json(ErrorBody::from(&self.0))).into_response()
    }
}

pub async fn latency(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<BTreeMap<String, RegionMetrics>>, ApiError> {
    let req = MetricsRequest::from_slice(&body?)?;
    Ok(Json(state.metrics(&req)))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError(LatscopeError::NotFound(uri.path().to_string()))
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError(LatscopeError::MethodNotAllowed(format!("{method} {}", uri.path())))
}
