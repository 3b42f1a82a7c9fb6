//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::{VerifierBuilderError, WebPkiClientVerifier};
use rustls::{RootCertStore, ServerConfig};

use crate::config::{ClientAuthMode, TlsConfig};

/// Error type for TLS setup.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No certificates found in {0:?}")]
    NoCertificates(PathBuf),

    #[error("No private key found in {0:?}")]
    NoPrivateKey(PathBuf),

    #[error("A client CA bundle is required to request client certificates")]
    MissingClientCa,

    #[error("TLS error: {0}")]
    Rustls(#[from] rustls::Error),

    #[error("Client verifier error: {0}")]
    Verifier(#[from] VerifierBuilderError),
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Load every certificate from a PEM file.
pub fn load_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let mut reader = open(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(TlsError::NoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

/// Load the first private key from a PEM file.
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::NoPrivateKey(path.to_path_buf()))
}

/// Build the listener's rustls configuration.
///
/// Clients are asked for a certificate chained to `client_ca_path`;
/// `ClientAuthMode::Optional` admits clients that send none.
pub fn load_server_config(tls: &TlsConfig) -> Result<ServerConfig, TlsError> {
    let ca_path = tls.client_ca_path.as_deref().ok_or(TlsError::MissingClientCa)?;
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let certs = load_certificates(&tls.cert_path)?;
    let key = load_private_key(&tls.key_path)?;

    let builder = ServerConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?;

    let verifier = client_verifier(ca_path, tls.client_auth, provider)?;
    let mut config = builder
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    tracing::info!(
        cert_path = ?tls.cert_path,
        client_ca_path = ?tls.client_ca_path,
        client_auth = ?tls.client_auth,
        "TLS configuration loaded"
    );
    Ok(config)
}

fn client_verifier(
    ca_path: &Path,
    mode: ClientAuthMode,
    provider: Arc<CryptoProvider>,
) -> Result<Arc<dyn rustls::server::danger::ClientCertVerifier>, TlsError> {
    let mut roots = RootCertStore::empty();
    for cert in load_certificates(ca_path)? {
        roots.add(cert)?;
    }
    tracing::debug!(ca_certs = roots.len(), "Client CA bundle loaded");

    let builder = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider);
    let verifier = match mode {
        ClientAuthMode::Required => builder.build()?,
        ClientAuthMode::Optional => builder.allow_unauthenticated().build()?,
    };
    Ok(verifier)
}
