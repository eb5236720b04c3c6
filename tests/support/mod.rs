#![allow(dead_code)]

pub mod mcp;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sheets_mcp::backend::{ApiError, SheetsBackend};
use sheets_mcp::config::ServerConfig;
use sheets_mcp::model::{
    AppendOptions, AppendValuesResponse, BatchGetValuesResponse, BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    ClearValuesResponse, CreateSpreadsheetRequest, GetSpreadsheetQuery,
    SearchDeveloperMetadataRequest, SearchDeveloperMetadataResponse, SheetProperties, Spreadsheet,
    UpdateValuesResponse, ValueRange, ValuesReadOptions,
};
use sheets_mcp::state::AppState;
use sheets_mcp::tools::param_enums::ValueInputOption;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

/// One request the backend received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub spreadsheet_id: String,
    pub payload: Value,
}

/// Holds calls to one backend method until released.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Resolves once a call has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// In-memory backend that records every request and answers with canned
/// JSON bodies. Methods without a canned body answer `{}`.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    responses: HashMap<&'static str, Value>,
    failures: HashMap<&'static str, ApiError>,
    gates: HashMap<&'static str, Arc<Gate>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, method: &'static str, body: Value) -> Self {
        self.responses.insert(method, body);
        self
    }

    pub fn fail(mut self, method: &'static str, error: ApiError) -> Self {
        self.failures.insert(method, error);
        self
    }

    /// Parks every call to `method` on `gate`.
    pub fn park(mut self, method: &'static str, gate: Arc<Gate>) -> Self {
        self.gates.insert(method, gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls
            .lock()
            .last()
            .cloned()
            .expect("backend was never called")
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        method: &'static str,
        spreadsheet_id: &str,
        payload: Value,
    ) -> Result<T> {
        if let Some(gate) = self.gates.get(method) {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.calls.lock().push(Call {
            method,
            spreadsheet_id: spreadsheet_id.to_string(),
            payload,
        });
        if let Some(error) = self.failures.get(method) {
            return Err(error.clone().into());
        }
        let body = self.responses.get(method).cloned().unwrap_or_else(|| json!({}));
        Ok(serde_json::from_value(body)?)
    }
}

fn read_options(options: ValuesReadOptions) -> Value {
    json!({
        "majorDimension": options.major_dimension.map(|d| d.as_str()),
        "valueRenderOption": options.value_render_option.map(|o| o.as_str()),
    })
}

#[async_trait]
impl SheetsBackend for RecordingBackend {
    async fn create_spreadsheet(&self, body: &CreateSpreadsheetRequest) -> Result<Spreadsheet> {
        self.answer("create_spreadsheet", "", serde_json::to_value(body)?).await
    }

    async fn get_spreadsheet(
        &self,
        spreadsheet_id: &str,
        query: &GetSpreadsheetQuery,
    ) -> Result<Spreadsheet> {
        let payload = json!({
            "ranges": query.ranges,
            "includeGridData": query.include_grid_data,
        });
        self.answer("get_spreadsheet", spreadsheet_id, payload).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        self.answer("batch_update", spreadsheet_id, serde_json::to_value(body)?).await
    }

    async fn copy_sheet_to(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        destination_spreadsheet_id: &str,
    ) -> Result<SheetProperties> {
        let payload = json!({
            "sheetId": sheet_id,
            "destinationSpreadsheetId": destination_spreadsheet_id,
        });
        self.answer("copy_sheet_to", spreadsheet_id, payload).await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: ValuesReadOptions,
    ) -> Result<ValueRange> {
        let mut payload = read_options(options);
        payload["range"] = json!(range);
        self.answer("get_values", spreadsheet_id, payload).await
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: ValueInputOption,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse> {
        let payload = json!({
            "range": range,
            "valueInputOption": value_input_option.as_str(),
            "body": body,
        });
        self.answer("update_values", spreadsheet_id, payload).await
    }

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: AppendOptions,
        body: &ValueRange,
    ) -> Result<AppendValuesResponse> {
        let payload = json!({
            "range": range,
            "valueInputOption": options.value_input_option.as_str(),
            "insertDataOption": options.insert_data_option.as_str(),
            "body": body,
        });
        self.answer("append_values", spreadsheet_id, payload).await
    }

    async fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse> {
        self.answer("clear_values", spreadsheet_id, json!({ "range": range })).await
    }

    async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: ValuesReadOptions,
    ) -> Result<BatchGetValuesResponse> {
        let mut payload = read_options(options);
        payload["ranges"] = json!(ranges);
        self.answer("batch_get_values", spreadsheet_id, payload).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse> {
        self.answer(
            "batch_update_values",
            spreadsheet_id,
            serde_json::to_value(body)?,
        ).await
    }

    async fn search_developer_metadata(
        &self,
        spreadsheet_id: &str,
        body: &SearchDeveloperMetadataRequest,
    ) -> Result<SearchDeveloperMetadataResponse> {
        self.answer(
            "search_developer_metadata",
            spreadsheet_id,
            serde_json::to_value(body)?,
        ).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn app_state(backend: Arc<RecordingBackend>) -> Arc<AppState> {
    app_state_with_config(ServerConfig::default(), backend)
}

pub fn app_state_with_config(
    config: ServerConfig,
    backend: Arc<RecordingBackend>,
) -> Arc<AppState> {
    Arc::new(AppState::with_backend(Arc::new(config), backend))
}

pub fn not_found(message: &str) -> ApiError {
    ApiError::new(
        404,
        "Not Found",
        json!({ "error": { "code": 404, "message": message, "status": "NOT_FOUND" } }),
    )
}

/// A spreadsheet with the given sheets, as `get_spreadsheet` returns it.
pub fn spreadsheet_body(id: &str, title: &str, sheets: &[Value]) -> Value {
    json!({
        "spreadsheetId": id,
        "properties": { "title": title, "locale": "en_US", "timeZone": "Europe/Paris" },
        "sheets": sheets.iter().map(|props| json!({ "properties": props })).collect::<Vec<_>>(),
    })
}
