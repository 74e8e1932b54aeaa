//! Telemetry dataset: immutable records loaded once at startup.
//!
//! The store is built before any request is served and is shared read-only
//! (behind an `Arc`) for the lifetime of the process. Requests never write to it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LatscopeError, Result};

/// Largest accepted magnitude for a numeric field. Keeps sums and means finite.
pub const MAX_FIELD_VALUE: f64 = 1e12;

/// One latency/uptime sample for a region.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetryRecord {
    pub region: String,
    pub latency_ms: f64,
    pub uptime_pct: f64,
}

/// Ordered, read-only collection of telemetry records.
#[derive(Debug, Default)]
pub struct TelemetryStore {
    records: Vec<TelemetryRecord>,
}

impl TelemetryStore {
    /// Build a store, rejecting negative latencies and values beyond [`MAX_FIELD_VALUE`].
    pub fn from_records(records: Vec<TelemetryRecord>) -> Result<Self> {
        for (idx, r) in records.iter().enumerate() {
            if !(0.0..=MAX_FIELD_VALUE).contains(&r.latency_ms) {
                return Err(LatscopeError::DatasetLoad(format!(
                    "record {idx} (region={}): latency_ms must be in [0, {MAX_FIELD_VALUE:e}], got {}",
                    r.region, r.latency_ms
                )));
            }
            if !(-MAX_FIELD_VALUE..=MAX_FIELD_VALUE).contains(&r.uptime_pct) {
                return Err(LatscopeError::DatasetLoad(format!(
                    "record {idx} (region={}): uptime_pct out of range, got {}",
                    r.region, r.uptime_pct
                )));
            }
            if !(0.0..=100.0).contains(&r.uptime_pct) {
                tracing::warn!(index = idx, region = %r.region, uptime_pct = r.uptime_pct, "uptime_pct outside [0, 100]");
            }
        }
        Ok(Self { records })
    }

    /// Parse a JSON array of `{region, latency_ms, uptime_pct}` objects.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let records: Vec<TelemetryRecord> = serde_json::from_str(s)
            .map_err(|e| LatscopeError::DatasetLoad(format!("invalid dataset json: {e}")))?;
        Self::from_records(records)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| {
            LatscopeError::DatasetLoad(format!("read {} failed: {e}", path.display()))
        })?;
        let store = Self::from_json_str(&s)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            regions = store.regions().len(),
            "telemetry dataset loaded"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Records whose region equals `region` exactly (case-sensitive), in load order.
    pub fn region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a TelemetryRecord> + 'a {
        self.records.iter().filter(move |r| r.region == region)
    }

    /// Distinct region names in first-seen order.
    pub fn regions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.region.as_str()))
            .map(|r| r.region.as_str())
            .collect()
    }
}
