//! Peer certificate chain attached to requests by the TLS layer.

use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use x509_parser::prelude::{FromDer, X509Certificate};

/// A single certificate presented by the peer during the handshake.
#[derive(Debug, Clone)]
pub struct PeerCertificate {
    der: CertificateDer<'static>,
    /// Subject distinguished name, if the DER could be parsed.
    pub subject: Option<String>,
    /// Issuer distinguished name, if the DER could be parsed.
    pub issuer: Option<String>,
}

impl PeerCertificate {
    /// Wrap DER bytes, extracting subject and issuer names on a best-effort basis.
    pub fn from_der(der: CertificateDer<'static>) -> Self {
        let (subject, issuer) = match X509Certificate::from_der(der.as_ref()) {
            Ok((_, cert)) => (
                Some(cert.subject().to_string()),
                Some(cert.issuer().to_string()),
            ),
            Err(_) => (None, None),
        };

        Self {
            der,
            subject,
            issuer,
        }
    }

    /// Raw DER bytes as received from the peer.
    pub fn der(&self) -> &[u8] {
        self.der.as_ref()
    }
}

/// Leaf-first certificate chain of the connection a request arrived on.
///
/// Index 0 is the client certificate, the rest is its issuing chain. Cloning
/// is cheap; every request on a connection shares the same chain.
#[derive(Debug, Clone, Default)]
pub struct PeerCertificates(Arc<[PeerCertificate]>);

impl PeerCertificates {
    /// Build a chain from DER certificates in handshake order.
    pub fn from_der_chain<I>(chain: I) -> Self
    where
        I: IntoIterator<Item = CertificateDer<'static>>,
    {
        Self(chain.into_iter().map(PeerCertificate::from_der).collect())
    }

    /// Chain as seen on a rustls server connection; empty when the client sent none.
    pub fn from_connection(peer: Option<&[CertificateDer<'_>]>) -> Self {
        match peer {
            Some(chain) => Self::from_der_chain(chain.iter().map(|c| c.clone().into_owned())),
            None => Self::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The client (leaf) certificate.
    pub fn leaf(&self) -> Option<&PeerCertificate> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeerCertificate> {
        self.0.iter()
    }
}
