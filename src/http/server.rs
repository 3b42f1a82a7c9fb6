//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the upstream forwarding handler
//! - Wire up middleware (certificate forwarding, timeout, request ID, tracing)
//! - Bind the TLS or plain listener
//! - Forward transformed requests to the upstream
//! - Graceful shutdown on Ctrl+C

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderName, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::forward::{ForwardCertLayer, ForwardSettings};
use crate::net::{load_server_config, PeerCertAcceptor, TlsError};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Error type for server startup and execution.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid bind address {0:?}")]
    BindAddress(String),

    #[error("Invalid upstream address {0:?}")]
    UpstreamAddress(String),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into the upstream handler.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Authority,
    pub client: Client<HttpConnector, Body>,
}

impl AppState {
    pub fn new(upstream_address: &str) -> Result<Self, ServerError> {
        let upstream = Authority::from_str(upstream_address)
            .map_err(|_| ServerError::UpstreamAddress(upstream_address.to_string()))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self { upstream, client })
    }
}

/// Build the router: every request is transformed, then sent upstream.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, settings: ForwardSettings, state: AppState) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .fallback(forward_upstream)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(ForwardCertLayer::new(settings)),
        )
}

/// Mutual-TLS gateway: terminates TLS, forwards the client chain as headers.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration and forwarding settings.
    pub fn new(config: GatewayConfig, settings: ForwardSettings) -> Result<Self, ServerError> {
        let state = AppState::new(&config.upstream.address)?;
        let router = build_router(&config, settings, state);
        Ok(Self { router, config })
    }

    /// Bind the configured listener and serve until Ctrl+C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|_| ServerError::BindAddress(self.config.listener.bind_address.clone()))?;

        let handle = Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        tokio::spawn(shutdown_signal(handle.clone(), grace));

        let app = self.router.into_make_service();

        match &self.config.listener.tls {
            Some(tls) => {
                let server_config = load_server_config(tls)?;
                let rustls_config = RustlsConfig::from_config(Arc::new(server_config));

                tracing::info!(
                    address = %addr,
                    upstream = %self.config.upstream.address,
                    "mTLS listener starting"
                );
                axum_server::bind(addr)
                    .handle(handle)
                    .acceptor(PeerCertAcceptor::new(rustls_config))
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::warn!(
                    address = %addr,
                    "No TLS configured; serving plain HTTP, client certificates cannot be forwarded"
                );
                axum_server::bind(addr).handle(handle).serve(app).await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Next handler: send the (already transformed) request to the upstream.
async fn forward_upstream(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    parts.headers.remove(header::HOST);
    // The upstream client speaks HTTP/1.1 regardless of the inbound protocol.
    parts.version = Version::HTTP_11;

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %parts.uri,
        "Forwarding request upstream"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Wait for Ctrl+C, then drain connections within `grace`.
async fn shutdown_signal(handle: Handle, grace: Duration) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!(grace_secs = grace.as_secs(), "Shutdown signal received");
    handle.graceful_shutdown(Some(grace));
}
