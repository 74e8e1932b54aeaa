//! Axum router wiring (framework adapter).
//!
//! - `POST /api/latency`    : per-region metrics
//! - `OPTIONS /api/latency` : empty 200 for pre-flight
//! - `GET /healthz`         : liveness

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, cors, transport};

pub const LATENCY_PATH: &str = "/api/latency";
pub const HEALTHZ_PATH: &str = "/healthz";

pub fn build_router(state: AppState) -> Router {
    let max_body = state.cfg().gateway.max_body_bytes;
    Router::new()
        .route(
            LATENCY_PATH,
            post(transport::http::latency)
                .options(transport::http::preflight)
                .fallback(transport::http::method_not_allowed),
        )
        .route(
            HEALTHZ_PATH,
            get(transport::http::healthz).fallback(transport::http::method_not_allowed),
        )
        .fallback(transport::http::not_found)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(middleware::map_response(cors::add_cors_headers))
        .with_state(state)
}
