//! Thin query shim over the price-graph evaluator.
//!
//! [`query`] is the pure function a caller uses regardless of transport;
//! [`router`] wraps it in a minimal `axum` route. Neither auth, pagination,
//! nor streaming is in scope here — this crate only marshals an already-built
//! DAG's evaluation into a response shape.

mod http;
mod result;

pub use http::{router, AppState};
pub use result::{query, QueryResult};
