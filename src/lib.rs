pub mod backend;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod model;
pub mod render;
pub mod resources;
pub mod server;
pub mod state;
pub mod tools;

pub use backend::{ApiError, HttpSheetsBackend, SheetsBackend};
pub use config::{CliArgs, ServerConfig, TransportKind};
pub use envelope::{ResourceEnvelope, ResultEnvelope};
pub use server::SheetsServer;
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use tokio::net::TcpListener;

const HTTP_SERVICE_PATH: &str = "/mcp";

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone())?);

    tracing::info!(
        transport = %config.transport,
        api = %config.api_base_url,
        "starting google sheets MCP server",
    );

    match config.transport {
        TransportKind::Stdio => SheetsServer::from_state(state).run_stdio().await,
        TransportKind::Http => run_stream_http_transport(config, state).await,
    }
}

async fn run_stream_http_transport(config: Arc<ServerConfig>, state: Arc<AppState>) -> Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(SheetsServer::from_state(state.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let router = Router::new().nest_service(HTTP_SERVICE_PATH, service);
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(transport = "http", bind = %actual_addr, path = HTTP_SERVICE_PATH, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::warn!(?error, "failed to listen for shutdown signal");
            }
        })
        .await?;
    tracing::info!("server stopped");
    Ok(())
}
