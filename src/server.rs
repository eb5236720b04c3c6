use crate::envelope::ResultEnvelope;
use crate::errors::InvalidParamsError;
use crate::resources;
use crate::state::AppState;
use crate::tools;
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Implementation, ListResourceTemplatesResult,
        PaginatedRequestParam, RawResourceTemplate, ReadResourceRequestParam, ReadResourceResult,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

const INSTRUCTIONS: &str = "\
Google Sheets MCP: read and edit Google spreadsheets through the Sheets v4 API.

WORKFLOW:
1) getSpreadsheet for titles, sheet names and the edit URL
2) getValues / batchGetValues to read cells (A1 notation, e.g. Sheet1!A1:C10)
3) updateValues / appendValues / batchUpdateValues to write; clearValues to blank a range
4) addSheet / deleteSheet / copySheet / updateSheetProperties to reshape tabs
5) batchUpdate for any raw Sheets API request not covered above

DEVELOPER METADATA:
- getDeveloperMetadata lists every item; create/update/delete address one item by ID.
- Locations: SPREADSHEET, SHEET (sheetId), ROW (sheetId,rowIndex), COLUMN (sheetId,columnIndex), CELL (sheetId,rowIndex,columnIndex).

RESOURCES:
- sheets://spreadsheet/{spreadsheetId}
- sheets://spreadsheet/{spreadsheetId}/sheet/{sheetName}
- sheets://spreadsheet/{spreadsheetId}/values/{range}
- sheets://spreadsheet/{spreadsheetId}/metadata

Remote failures come back as tool results flagged isError with the API status and message.";

#[derive(Clone)]
pub struct SheetsServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<SheetsServer>,
}

impl SheetsServer {
    pub fn from_state(state: Arc<AppState>) -> Self {
        let mut router = Self::spreadsheet_tool_router();
        router.merge(Self::sheet_tool_router());
        router.merge(Self::values_tool_router());
        router.merge(Self::metadata_tool_router());

        Self {
            state,
            tool_router: router,
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<(), McpError> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(to_mcp_error(ToolDisabledError::new(tool).into()))
        }
    }

    async fn run_tool<F>(&self, tool: &'static str, fut: F) -> Result<CallToolResult, McpError>
    where
        F: Future<Output = Result<String>>,
    {
        self.ensure_tool_enabled(tool)?;
        tools::invoke(tool, fut)
            .await
            .map(ResultEnvelope::into)
            .map_err(|error| to_mcp_error(error.into()))
    }
}

#[tool_router(router = spreadsheet_tool_router)]
impl SheetsServer {
    #[tool(
        name = "createSpreadsheet",
        description = "Creates a new spreadsheet with the specified properties"
    )]
    pub async fn create_spreadsheet(
        &self,
        Parameters(params): Parameters<tools::CreateSpreadsheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "createSpreadsheet",
            tools::create_spreadsheet(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "getSpreadsheet", description = "Gets a spreadsheet by ID")]
    pub async fn get_spreadsheet(
        &self,
        Parameters(params): Parameters<tools::GetSpreadsheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "getSpreadsheet",
            tools::get_spreadsheet(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "batchUpdate",
        description = "Applies one or more updates to a spreadsheet"
    )]
    pub async fn batch_update(
        &self,
        Parameters(params): Parameters<tools::BatchUpdateParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("batchUpdate", tools::batch_update(self.state.clone(), params))
            .await
    }
}

#[tool_router(router = sheet_tool_router)]
impl SheetsServer {
    #[tool(name = "copySheet", description = "Copies a sheet to another spreadsheet")]
    pub async fn copy_sheet(
        &self,
        Parameters(params): Parameters<tools::CopySheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("copySheet", tools::copy_sheet(self.state.clone(), params))
            .await
    }

    #[tool(name = "addSheet", description = "Adds a new sheet to a spreadsheet")]
    pub async fn add_sheet(
        &self,
        Parameters(params): Parameters<tools::AddSheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("addSheet", tools::add_sheet(self.state.clone(), params))
            .await
    }

    #[tool(name = "deleteSheet", description = "Deletes a sheet from a spreadsheet")]
    pub async fn delete_sheet(
        &self,
        Parameters(params): Parameters<tools::DeleteSheetParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("deleteSheet", tools::delete_sheet(self.state.clone(), params))
            .await
    }

    #[tool(
        name = "updateSheetProperties",
        description = "Updates the properties of a sheet"
    )]
    pub async fn update_sheet_properties(
        &self,
        Parameters(params): Parameters<tools::UpdateSheetPropertiesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "updateSheetProperties",
            tools::update_sheet_properties(self.state.clone(), params),
        )
        .await
    }
}

#[tool_router(router = values_tool_router)]
impl SheetsServer {
    #[tool(name = "getValues", description = "Gets values from a spreadsheet")]
    pub async fn get_values(
        &self,
        Parameters(params): Parameters<tools::GetValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("getValues", tools::get_values(self.state.clone(), params))
            .await
    }

    #[tool(name = "updateValues", description = "Updates values in a spreadsheet")]
    pub async fn update_values(
        &self,
        Parameters(params): Parameters<tools::UpdateValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "updateValues",
            tools::update_values(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "appendValues", description = "Appends values to a spreadsheet")]
    pub async fn append_values(
        &self,
        Parameters(params): Parameters<tools::AppendValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "appendValues",
            tools::append_values(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "clearValues", description = "Clears values from a spreadsheet")]
    pub async fn clear_values(
        &self,
        Parameters(params): Parameters<tools::ClearValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool("clearValues", tools::clear_values(self.state.clone(), params))
            .await
    }

    #[tool(
        name = "batchGetValues",
        description = "Gets values from multiple ranges of a spreadsheet"
    )]
    pub async fn batch_get_values(
        &self,
        Parameters(params): Parameters<tools::BatchGetValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "batchGetValues",
            tools::batch_get_values(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "batchUpdateValues",
        description = "Updates multiple ranges of values in a spreadsheet"
    )]
    pub async fn batch_update_values(
        &self,
        Parameters(params): Parameters<tools::BatchUpdateValuesParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "batchUpdateValues",
            tools::batch_update_values(self.state.clone(), params),
        )
        .await
    }
}

#[tool_router(router = metadata_tool_router)]
impl SheetsServer {
    #[tool(
        name = "getDeveloperMetadata",
        description = "Gets all developer metadata for a spreadsheet"
    )]
    pub async fn get_developer_metadata(
        &self,
        Parameters(params): Parameters<tools::GetDeveloperMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "getDeveloperMetadata",
            tools::get_developer_metadata(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "createDeveloperMetadata",
        description = "Creates developer metadata for a spreadsheet"
    )]
    pub async fn create_developer_metadata(
        &self,
        Parameters(params): Parameters<tools::CreateDeveloperMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "createDeveloperMetadata",
            tools::create_developer_metadata(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "updateDeveloperMetadata",
        description = "Updates existing developer metadata"
    )]
    pub async fn update_developer_metadata(
        &self,
        Parameters(params): Parameters<tools::UpdateDeveloperMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "updateDeveloperMetadata",
            tools::update_developer_metadata(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "deleteDeveloperMetadata", description = "Deletes developer metadata")]
    pub async fn delete_developer_metadata(
        &self,
        Parameters(params): Parameters<tools::DeleteDeveloperMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_tool(
            "deleteDeveloperMetadata",
            tools::delete_developer_metadata(self.state.clone(), params),
        )
        .await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SheetsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let templates = resources::catalogue()
            .iter()
            .map(|descriptor| {
                RawResourceTemplate {
                    uri_template: descriptor.template.as_str().to_string(),
                    name: descriptor.kind.name().to_string(),
                    title: None,
                    description: Some(descriptor.description.to_string()),
                    mime_type: Some("text/plain".to_string()),
                }
                .no_annotation()
            })
            .collect();
        Ok(ListResourceTemplatesResult::with_all_items(templates))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        match resources::read(self.state.clone(), &uri).await {
            Some(envelope) => Ok(envelope.into()),
            None => Err(McpError::resource_not_found(
                format!("no resource matches {uri}"),
                None,
            )),
        }
    }
}

fn to_mcp_error(error: anyhow::Error) -> McpError {
    if error.is::<ToolDisabledError>() {
        return McpError::invalid_request(error.to_string(), None);
    }
    if let Some(invalid) = error.downcast_ref::<InvalidParamsError>() {
        return McpError::invalid_params(invalid.describe(), None);
    }
    McpError::internal_error(error.to_string(), None)
}

#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}
