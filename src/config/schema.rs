//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the mTLS forwarding gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream the transformed requests are sent to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Certificate forwarding middleware.
    pub forward: ForwardConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// TLS termination. Without it the listener serves plain HTTP and no
    /// certificates are ever forwarded.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,

    /// CA bundle (PEM) used to verify client certificates.
    pub client_ca_path: Option<PathBuf>,

    /// Whether clients must present a certificate.
    #[serde(default)]
    pub client_auth: ClientAuthMode,
}

/// Client authentication mode for incoming TLS connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientAuthMode {
    /// Handshake fails without a valid client certificate.
    #[default]
    Required,
    /// Clients without a certificate are admitted; nothing is forwarded for them.
    Optional,
}

/// Upstream (next handler) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:8080").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Time allowed for in-flight requests to finish after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Certificate forwarding configuration, as written in the `[forward]` table.
///
/// ```toml
/// [forward]
/// encodePem = true
/// encodeURL = true
///
/// [forward.headers]
/// sslClientCert = "SSL_CLIENT_CERT"
/// sslCertChainPrefix = "CERT_CHAIN"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Instance name, used in log events.
    pub name: String,

    /// Header role → header name. Both `sslClientCert` and
    /// `sslCertChainPrefix` are required.
    pub headers: HashMap<String, String>,

    /// Forward PEM blocks instead of bare base64 DER.
    ///
    /// Requires `encodeURL`: PEM line feeds are not valid in a header value,
    /// so `encodePem = true` with `encodeURL = false` is rejected at startup.
    #[serde(rename = "encodePem")]
    pub encode_pem: bool,

    /// Query-escape the encoded certificate.
    #[serde(rename = "encodeURL")]
    pub encode_url: bool,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            name: "mtls-forward".to_string(),
            headers: HashMap::new(),
            encode_pem: false,
            encode_url: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8443");
        assert!(config.listener.tls.is_none());
        assert_eq!(config.upstream.address, "127.0.0.1:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.forward.name, "mtls-forward");
        assert!(!config.forward.encode_pem);
        assert!(!config.forward.encode_url);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_forward_table_uses_manifest_keys() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [forward]
            encodePem = true
            encodeURL = true

            [forward.headers]
            sslClientCert = "SSL_CLIENT_CERT"
            sslCertChainPrefix = "CERT_CHAIN"
            "#,
        )
        .unwrap();

        assert!(config.forward.encode_pem);
        assert!(config.forward.encode_url);
        assert_eq!(config.forward.headers["sslClientCert"], "SSL_CLIENT_CERT");
        assert_eq!(config.forward.headers["sslCertChainPrefix"], "CERT_CHAIN");
    }

    #[test]
    fn test_tls_client_auth_modes() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener.tls]
            cert_path = "server.pem"
            key_path = "server.key"
            client_ca_path = "ca.pem"
            "#,
        )
        .unwrap();
        let tls = config.listener.tls.unwrap();
        assert_eq!(tls.client_auth, ClientAuthMode::Required);

        let config: GatewayConfig = toml::from_str(
            r#"
            [listener.tls]
            cert_path = "server.pem"
            key_path = "server.key"
            client_auth = "optional"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.tls.unwrap().client_auth, ClientAuthMode::Optional);
    }

    #[test]
    fn test_unknown_client_auth_rejected() {
        let result: Result<GatewayConfig, _> = toml::from_str(
            r#"
            [listener.tls]
            cert_path = "server.pem"
            key_path = "server.key"
            client_auth = "sometimes"
            "#,
        );
        assert!(result.is_err());
    }
}
