//! Per-region metrics calculator.
//!
//! Pure function over the shared dataset: no locking, no caching, every call
//! recomputes from the full store.
//!
//! Percentile convention: linear interpolation between closest ranks with
//! rank index `k = (n - 1) * p`. This is the same value the "linear" method of
//! common numeric libraries yields, so there is a single p95 definition.

use std::collections::BTreeMap;

use crate::protocol::RegionMetrics;
use crate::telemetry::TelemetryStore;

const P95: f64 = 0.95;

/// Compute metrics for each requested region.
///
/// Unknown regions get [`RegionMetrics::empty`]. Duplicated region names
/// collapse into one entry with the same value.
pub fn compute<S: AsRef<str>>(
    store: &TelemetryStore,
    regions: &[S],
    threshold_ms: f64,
) -> BTreeMap<String, RegionMetrics> {
    let mut out = BTreeMap::new();
    for region in regions {
        let region = region.as_ref();
        if out.contains_key(region) {
            continue;
        }
        out.insert(region.to_string(), region_metrics(store, region, threshold_ms));
    }
    tracing::debug!(requested = regions.len(), distinct = out.len(), threshold_ms, "metrics computed");
    out
}

fn region_metrics(store: &TelemetryStore, region: &str, threshold_ms: f64) -> RegionMetrics {
    let mut latencies = Vec::new();
    let mut uptimes = Vec::new();
    for r in store.region(region) {
        latencies.push(r.latency_ms);
        uptimes.push(r.uptime_pct);
    }
    if latencies.is_empty() {
        return RegionMetrics::empty();
    }

    // strict: a sample equal to the threshold is not a breach
    let breaches = latencies.iter().filter(|&&l| l > threshold_ms).count() as u64;

    RegionMetrics {
        avg_latency: mean(&latencies).map(round4),
        p95_latency: percentile(&mut latencies, P95).map(round4),
        avg_uptime: mean(&uptimes).map(round4),
        breaches,
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `p`-quantile (`p` in `[0, 1]`) by linear interpolation between closest ranks.
/// Sorts `values` in place. `None` for an empty slice.
pub fn percentile(values: &mut [f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);

    let n = values.len();
    let k = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = k.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Some(values[lo] + (values[hi] - values[lo]) * (k - lo as f64))
}

/// Round to 4 decimal places in a single step.
///
/// Formatting works from the exact binary value, so a stored `10.74485`
/// (really `10.744849999...`) becomes `10.7448`. Scaling by `1e4` first
/// would round twice and could land on `.5`.
pub fn round4(x: f64) -> f64 {
    format!("{x:.4}").parse().unwrap_or(x)
}
