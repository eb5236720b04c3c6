use anyhow::Result;
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, ErrorData},
    service::{RunningService, ServiceError},
};
use serde_json::Value;
use sheets_mcp::SheetsServer;
use sheets_mcp::state::AppState;
use std::sync::Arc;

pub type TestClient = RunningService<RoleClient, ()>;

pub fn call_tool(name: &'static str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: args.as_object().cloned(),
    }
}

/// Serves a fresh `SheetsServer` over an in-process pipe and returns a client
/// connected to it.
pub async fn connect(state: Arc<AppState>) -> Result<TestClient> {
    let (server_io, client_io) = tokio::io::duplex(64 * 1024);
    let server = SheetsServer::from_state(state);
    tokio::spawn(async move {
        match server.serve(server_io).await {
            Ok(service) => {
                let _ = service.waiting().await;
            }
            Err(error) => eprintln!("test server failed to start: {error:?}"),
        }
    });
    Ok(().serve(client_io).await?)
}

/// The protocol error behind a failed request.
pub fn mcp_error(error: ServiceError) -> ErrorData {
    match error {
        ServiceError::McpError(data) => data,
        other => panic!("expected an MCP error, got {other:?}"),
    }
}

pub fn first_text(result: &rmcp::model::CallToolResult) -> String {
    let content = serde_json::to_value(&result.content).unwrap_or_default();
    content[0]["text"].as_str().unwrap_or_default().to_string()
}
