//! Mutual-TLS client certificate forwarding gateway.
//!
//! Terminates TLS, takes the certificate chain the client presented and
//! passes it to the upstream as request headers.

pub mod config;
pub mod forward;
pub mod http;
pub mod net;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use forward::{ForwardCertLayer, ForwardSettings, PeerCertificates};
pub use http::GatewayServer;
