//! TLS acceptor that exposes the peer certificate chain to request handlers.

use std::io;

use axum_server::accept::{Accept, DefaultAcceptor};
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower_http::add_extension::AddExtension;

use crate::forward::PeerCertificates;

/// Wraps [`RustlsAcceptor`]; once the handshake completes, the connection's
/// service is wrapped so each request carries a [`PeerCertificates`] extension.
#[derive(Clone)]
pub struct PeerCertAcceptor {
    inner: RustlsAcceptor<DefaultAcceptor>,
}

impl PeerCertAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for PeerCertAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, PeerCertificates>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await.map_err(|e| {
                tracing::debug!(error = %e, "TLS handshake failed");
                e
            })?;

            let (_, connection) = stream.get_ref();
            let certs = PeerCertificates::from_connection(connection.peer_certificates());

            match certs.leaf() {
                Some(leaf) => tracing::debug!(
                    chain_len = certs.len(),
                    subject = leaf.subject.as_deref().unwrap_or("<unparsed>"),
                    "Client presented certificate"
                ),
                None => tracing::debug!("Client presented no certificate"),
            }

            Ok((stream, AddExtension::new(service, certs)))
        })
    }
}
