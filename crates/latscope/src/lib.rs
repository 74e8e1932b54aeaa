//! Top-level facade crate for latscope.
//!
//! Re-exports the calculator core and the HTTP gateway so users can depend on a single crate.

pub mod core {
    pub use latscope_core::*;
}

pub mod gateway {
    pub use latscope_gateway::*;
}
