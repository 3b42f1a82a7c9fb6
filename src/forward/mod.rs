//! Client certificate forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! TLS handshake (net::acceptor)
//!     → PeerCertificates request extension (peer.rs)
//!     → ForwardCert service (layer.rs)
//!     → ForwardSettings::apply (settings.rs)
//!         index 0      → <sslClientCert>
//!         index i >= 1 → <sslCertChainPrefix>_<i-1>
//!     → encode.rs (base64 or PEM, then optional query escaping)
//!     → next handler
//! ```
//!
//! # Design Decisions
//! - Settings are validated once and shared read-only behind an `Arc`
//! - The transform has no failure path; requests without a chain pass through
//! - Certificates are re-encoded from raw DER, never re-validated

pub mod encode;
pub mod layer;
pub mod peer;
pub mod settings;

pub use encode::{encode_certificate, CertEncoding};
pub use layer::{ForwardCert, ForwardCertLayer};
pub use peer::{PeerCertificate, PeerCertificates};
pub use settings::{ForwardConfigError, ForwardSettings, SSL_CERT_CHAIN_PREFIX, SSL_CLIENT_CERT};
