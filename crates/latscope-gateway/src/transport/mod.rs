//! Transport adapters. Both parse into `MetricsRequest`, call the shared
//! calculator through `AppState`, and share one error contract.
//!
//! - `http`: axum handlers mounted by `router::build_router`
//! - `raw` : hand-rolled HTTP/1.1 over `tokio::net::TcpStream`

pub mod http;
pub mod raw;
