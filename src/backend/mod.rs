use crate::model::{
    AppendOptions, AppendValuesResponse, BatchGetValuesResponse, BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    ClearValuesResponse, CreateSpreadsheetRequest, GetSpreadsheetQuery,
    SearchDeveloperMetadataRequest, SearchDeveloperMetadataResponse, SheetProperties, Spreadsheet,
    UpdateValuesResponse, ValueRange, ValuesReadOptions,
};
use crate::tools::param_enums::ValueInputOption;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod auth;
pub mod http;

pub use auth::{OAuthCredentials, TokenProvider};
pub use http::HttpSheetsBackend;

/// The remote spreadsheet service. One instance is shared read-only by every
/// handler for the lifetime of the process.
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    async fn create_spreadsheet(&self, body: &CreateSpreadsheetRequest) -> Result<Spreadsheet>;

    async fn get_spreadsheet(
        &self,
        spreadsheet_id: &str,
        query: &GetSpreadsheetQuery,
    ) -> Result<Spreadsheet>;

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse>;

    async fn copy_sheet_to(
        &self,
        spreadsheet_id: &str,
        sheet_id: i32,
        destination_spreadsheet_id: &str,
    ) -> Result<SheetProperties>;

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: ValuesReadOptions,
    ) -> Result<ValueRange>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        value_input_option: ValueInputOption,
        body: &ValueRange,
    ) -> Result<UpdateValuesResponse>;

    async fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        options: AppendOptions,
        body: &ValueRange,
    ) -> Result<AppendValuesResponse>;

    async fn clear_values(&self, spreadsheet_id: &str, range: &str)
    -> Result<ClearValuesResponse>;

    async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        options: ValuesReadOptions,
    ) -> Result<BatchGetValuesResponse>;

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        body: &BatchUpdateValuesRequest,
    ) -> Result<BatchUpdateValuesResponse>;

    async fn search_developer_metadata(
        &self,
        spreadsheet_id: &str,
        body: &SearchDeveloperMetadataRequest,
    ) -> Result<SearchDeveloperMetadataResponse>;

    fn name(&self) -> &'static str;
}

/// A non-success HTTP reply from the remote service.
#[derive(Debug, Clone, Error)]
#[error("{}", self.message())]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub data: Value,
}

impl ApiError {
    pub fn new(status: u16, status_text: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            data,
        }
    }

    /// The nested `error.message` when the payload has one, otherwise the
    /// whole payload serialized.
    pub fn message(&self) -> String {
        match self.data.pointer("/error/message").and_then(Value::as_str) {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => self.data.to_string(),
        }
    }
}
