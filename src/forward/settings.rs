//! Validated forwarding settings and the header transform itself.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ForwardConfig;
use crate::forward::encode::{encode_certificate, CertEncoding};
use crate::forward::peer::PeerCertificates;

/// Header role receiving the client (leaf) certificate.
pub const SSL_CLIENT_CERT: &str = "sslClientCert";

/// Header role whose value prefixes the chain certificate headers.
pub const SSL_CERT_CHAIN_PREFIX: &str = "sslCertChainPrefix";

/// Fatal errors raised while building [`ForwardSettings`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ForwardConfigError {
    #[error("configuration option '{0}' not set")]
    MissingHeader(&'static str),

    #[error("configuration option '{role}' yields invalid header name {name:?}")]
    InvalidHeaderName { role: &'static str, name: String },

    #[error("encodePem requires encodeURL: PEM line feeds are not valid in header values")]
    PemRequiresUrlEncoding,
}

/// Immutable forwarding configuration, built once and shared by every request.
#[derive(Debug, Clone)]
pub struct ForwardSettings {
    name: String,
    client_cert_header: HeaderName,
    chain_prefix: String,
    encoding: CertEncoding,
}

impl ForwardSettings {
    /// Validate the raw configuration.
    ///
    /// Header roles are checked in a fixed order and the first missing one is
    /// reported.
    pub fn from_config(config: &ForwardConfig) -> Result<Self, ForwardConfigError> {
        let client_cert = config
            .headers
            .get(SSL_CLIENT_CERT)
            .ok_or(ForwardConfigError::MissingHeader(SSL_CLIENT_CERT))?;
        let chain_prefix = config
            .headers
            .get(SSL_CERT_CHAIN_PREFIX)
            .ok_or(ForwardConfigError::MissingHeader(SSL_CERT_CHAIN_PREFIX))?;

        let client_cert_header = HeaderName::try_from(client_cert.as_str()).map_err(|_| {
            ForwardConfigError::InvalidHeaderName {
                role: SSL_CLIENT_CERT,
                name: client_cert.clone(),
            }
        })?;

        // A valid "<prefix>_0" means every "<prefix>_<n>" is valid too.
        let first_chain = chain_header_name(chain_prefix, 0);
        if HeaderName::try_from(first_chain.as_str()).is_err() {
            return Err(ForwardConfigError::InvalidHeaderName {
                role: SSL_CERT_CHAIN_PREFIX,
                name: first_chain,
            });
        }

        if config.encode_pem && !config.encode_url {
            return Err(ForwardConfigError::PemRequiresUrlEncoding);
        }

        Ok(Self {
            name: config.name.clone(),
            client_cert_header,
            chain_prefix: chain_prefix.clone(),
            encoding: CertEncoding::new(config.encode_pem, config.encode_url),
        })
    }

    /// Instance name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client_cert_header(&self) -> &HeaderName {
        &self.client_cert_header
    }

    pub fn chain_prefix(&self) -> &str {
        &self.chain_prefix
    }

    pub fn encoding(&self) -> CertEncoding {
        self.encoding
    }

    /// Write the peer chain into `headers`, returning how many headers were set.
    ///
    /// Existing values under the target names are replaced. Requests without a
    /// chain are left untouched.
    pub fn apply(&self, headers: &mut HeaderMap, certs: Option<&PeerCertificates>) -> usize {
        let Some(certs) = certs.filter(|c| !c.is_empty()) else {
            return 0;
        };

        let mut written = 0;
        for (index, cert) in certs.iter().enumerate() {
            tracing::debug!(
                middleware = %self.name,
                index,
                subject = cert.subject.as_deref().unwrap_or("<unparsed>"),
                issuer = cert.issuer.as_deref().unwrap_or("<unparsed>"),
                "Found peer certificate"
            );

            let name = if index == 0 {
                self.client_cert_header.clone()
            } else {
                let raw = chain_header_name(&self.chain_prefix, index - 1);
                match HeaderName::try_from(raw) {
                    Ok(name) => name,
                    Err(e) => {
                        tracing::warn!(middleware = %self.name, index, error = %e, "Skipping chain certificate");
                        continue;
                    }
                }
            };

            let encoded = encode_certificate(cert.der(), self.encoding);
            match HeaderValue::try_from(encoded) {
                Ok(value) => {
                    headers.insert(name, value);
                    written += 1;
                }
                Err(e) => {
                    tracing::warn!(middleware = %self.name, index, error = %e, "Encoded certificate is not a valid header value");
                }
            }
        }

        written
    }
}

/// Header name for the chain certificate at zero-based chain position `position`.
pub fn chain_header_name(prefix: &str, position: usize) -> String {
    format!("{}_{}", prefix, position)
}
