//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (net::acceptor)
//!     → server.rs (Axum setup, middleware stack)
//!     → request ID, tracing, timeout
//!     → forward::ForwardCertLayer (certificate headers)
//!     → upstream handler (hyper client)
//! ```

pub mod server;

pub use server::{build_router, AppState, GatewayServer, ServerError, X_REQUEST_ID};
