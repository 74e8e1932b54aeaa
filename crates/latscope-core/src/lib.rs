//! latscope core: telemetry dataset, wire types, error surface, and the
//! per-region metrics calculator.
//!
//! This crate carries no transport or runtime dependencies. Both HTTP
//! adapters in the gateway parse requests into [`protocol::MetricsRequest`]
//! and hand them to [`metrics::compute`]; nothing here knows about sockets.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `LatscopeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod protocol;
pub mod telemetry;

/// Shared result type.
pub use error::{Result, LatscopeError};
pub use metrics::compute;
pub use protocol::{MetricsRequest, RegionMetrics};
pub use telemetry::{TelemetryRecord, TelemetryStore};
