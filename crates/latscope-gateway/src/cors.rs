//! Permissive cross-origin headers, attached to every response.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "POST, OPTIONS"),
    ("access-control-allow-headers", "Content-Type, Authorization"),
];

pub fn apply(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
}

/// `axum::middleware::map_response` hook.
pub async fn add_cors_headers(mut res: Response) -> Response {
    apply(res.headers_mut());
    res
}
