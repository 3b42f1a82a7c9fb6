//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection (axum-server)
//!     → tls.rs (rustls ServerConfig, client certificate verification)
//!     → acceptor.rs (handshake, capture peer chain)
//!     → PeerCertificates attached to every request on the connection
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Chain-of-trust checks happen in rustls during the handshake only
//! - The chain is captured once per connection, shared by its requests
//! - TLS is optional; plain listeners never attach a chain

pub mod acceptor;
pub mod tls;

pub use acceptor::PeerCertAcceptor;
pub use tls::{load_server_config, TlsError};
