//! latscope gateway library entry.
//!
//! Wires config, the shared dataset state, CORS decoration, and the two
//! interchangeable HTTP front ends (axum router and raw socket adapter)
//! around the calculator in `latscope-core`. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod cors;
pub mod router;
pub mod transport;
