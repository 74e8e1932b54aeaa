//! Wire types for `POST /api/latency`.
//!
//! Request: `{"regions": [string...], "threshold_ms": number}`, both required.
//! Response: `{region: RegionMetrics, ...}`. Absent statistics serialize as
//! JSON `null`, never omitted, so clients can tell "no data" from `0`.

use serde::{Deserialize, Serialize};

use crate::error::{LatscopeError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricsRequest {
    pub regions: Vec<String>,
    pub threshold_ms: f64,
}

impl MetricsRequest {
    /// Decode a JSON request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| LatscopeError::BadRequest(format!("invalid request json: {e}")))
    }
}

/// Aggregates for one region.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegionMetrics {
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub avg_uptime: Option<f64>,
    pub breaches: u64,
}

impl RegionMetrics {
    /// Entry for a region with no records.
    pub fn empty() -> Self {
        Self {
            avg_latency: None,
            p95_latency: None,
            avg_uptime: None,
            breaches: 0,
        }
    }
}

/// Error envelope written by both adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl From<&LatscopeError> for ErrorBody {
    fn from(e: &LatscopeError) -> Self {
        Self {
            error: e.to_string(),
            code: e.client_code().as_str().to_string(),
        }
    }
}
