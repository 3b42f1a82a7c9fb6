//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{http::HeaderMap, Json, Router};
use rustls::pki_types::CertificateDer;
use tokio::net::TcpListener;

use mtls_forward::config::ForwardConfig;
use mtls_forward::forward::{SSL_CERT_CHAIN_PREFIX, SSL_CLIENT_CERT};

#[allow(dead_code)]
pub const CLIENT_PEM: &str = include_str!("../fixtures/client.pem");
#[allow(dead_code)]
pub const CA_PEM: &str = include_str!("../fixtures/ca.pem");
#[allow(dead_code)]
pub const CLIENT_PEM_ESCAPED: &str = include_str!("../fixtures/client.pem.escaped");
#[allow(dead_code)]
pub const CA_PEM_ESCAPED: &str = include_str!("../fixtures/ca.pem.escaped");

/// Parse the single certificate in a PEM fixture.
#[allow(dead_code)]
pub fn fixture_der(pem: &str) -> CertificateDer<'static> {
    let mut reader = pem.as_bytes();
    let cert = rustls_pemfile::certs(&mut reader)
        .next()
        .expect("fixture has a certificate")
        .expect("fixture parses");
    cert
}

/// Client certificate followed by its issuing CA.
#[allow(dead_code)]
pub fn fixture_chain() -> Vec<CertificateDer<'static>> {
    vec![fixture_der(CLIENT_PEM), fixture_der(CA_PEM)]
}

/// Forwarding config with the conventional header names.
pub fn forward_config(encode_pem: bool, encode_url: bool) -> ForwardConfig {
    let mut config = ForwardConfig {
        encode_pem,
        encode_url,
        ..ForwardConfig::default()
    };
    config
        .headers
        .insert(SSL_CLIENT_CERT.to_string(), "SSL_CLIENT_CERT".to_string());
    config
        .headers
        .insert(SSL_CERT_CHAIN_PREFIX.to_string(), "CERT_CHAIN".to_string());
    config
}

/// Start a mock upstream that answers with the request headers as JSON.
#[allow(dead_code)]
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(|headers: HeaderMap| async move {
        let echoed: HashMap<String, String> = headers
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        Json(echoed)
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
