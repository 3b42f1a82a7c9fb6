//! mTLS certificate forwarding gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                  MTLS-FORWARD                        │
//!                      │                                                      │
//!   Client (mTLS)      │  ┌──────────┐    ┌───────────┐    ┌──────────────┐   │
//!   ───────────────────┼─▶│ acceptor │───▶│  router   │───▶│ ForwardCert  │   │
//!                      │  │ + rustls │    │ + layers  │    │   headers    │   │
//!                      │  └──────────┘    └───────────┘    └──────┬───────┘   │
//!                      │                                          │           │
//!   Client Response    │                                          ▼           │
//!   ◀──────────────────┼──────────────────────────────────  upstream client ──┼──▶ Backend
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mtls_forward::config::{forward_settings, load_config};
use mtls_forward::http::GatewayServer;
use mtls_forward::observability::init_logging;

#[derive(Parser)]
#[command(name = "mtls-forward")]
#[command(about = "Forwards mTLS client certificates to an upstream as HTTP headers", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "mtls-forward.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    let settings = forward_settings(&config)?;

    if cli.check {
        println!("{}: configuration OK", cli.config.display());
        return Ok(());
    }

    init_logging(&config.observability);

    tracing::info!("mtls-forward v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        tls = config.listener.tls.is_some(),
        client_cert_header = %settings.client_cert_header(),
        chain_prefix = %settings.chain_prefix(),
        encode_pem = settings.encoding().pem,
        encode_url = settings.encoding().url_escape,
        "Configuration loaded"
    );

    let server = GatewayServer::new(config, settings)?;
    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
