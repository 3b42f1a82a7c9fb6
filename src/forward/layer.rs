//! Tower middleware that forwards the peer chain as request headers.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::forward::peer::PeerCertificates;
use crate::forward::settings::ForwardSettings;

/// Layer producing [`ForwardCert`] services that share one [`ForwardSettings`].
#[derive(Debug, Clone)]
pub struct ForwardCertLayer {
    settings: Arc<ForwardSettings>,
}

impl ForwardCertLayer {
    pub fn new(settings: ForwardSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl<S> Layer<S> for ForwardCertLayer {
    type Service = ForwardCert<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ForwardCert {
            inner,
            settings: self.settings.clone(),
        }
    }
}

/// Middleware service: writes certificate headers, then always calls `inner`.
#[derive(Debug, Clone)]
pub struct ForwardCert<S> {
    inner: S,
    settings: Arc<ForwardSettings>,
}

impl<S, B> Service<Request<B>> for ForwardCert<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let certs = req.extensions().get::<PeerCertificates>().cloned();
        let written = self.settings.apply(req.headers_mut(), certs.as_ref());

        tracing::trace!(
            middleware = %self.settings.name(),
            headers_written = written,
            "Ready for next handler"
        );

        self.inner.call(req)
    }
}
