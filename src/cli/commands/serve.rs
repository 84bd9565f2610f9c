//! `serve`: run the HTTP gateway until Ctrl-C.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::adapters::http::{AppState, GatewayHttpServer, HttpServerConfig};
use crate::domain::models::Config;
use crate::infrastructure::gateway::{GatewayClient, GatewayClientConfig};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config: &Config, _json_mode: bool) -> Result<()> {
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let gateway_config = GatewayClientConfig::from_config(&config.gateway)?;
    let gateway = GatewayClient::new(gateway_config)?;
    tracing::info!(
        endpoint = gateway.endpoint(),
        model = %config.gateway.model,
        forward_caller_credential = config.gateway.forward_caller_credential,
        exams = config.exams.len(),
        persona_overrides = config.personas.len(),
        "gateway configured"
    );

    let mut server_config = HttpServerConfig::from(&config.server);
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let state = AppState::new(Arc::new(gateway), config);
    GatewayHttpServer::new(state, server_config)
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!(e))
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
