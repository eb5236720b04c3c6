use crate::model::{
    BatchUpdateSpreadsheetRequest, CreateSpreadsheetRequest, GetSpreadsheetQuery,
    SpreadsheetProperties, edit_url,
};
use crate::state::AppState;
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSpreadsheetParams {
    /// Properties of the new spreadsheet (title, locale, time zone, ...)
    pub properties: Option<SpreadsheetProperties>,
    /// Initial sheets, as Sheets API `Sheet` objects
    pub sheets: Option<Vec<Value>>,
    /// Initial named ranges, as Sheets API `NamedRange` objects
    pub named_ranges: Option<Vec<Value>>,
}

pub async fn create_spreadsheet(
    state: Arc<AppState>,
    params: CreateSpreadsheetParams,
) -> Result<String> {
    let body = CreateSpreadsheetRequest {
        properties: params.properties,
        sheets: params.sheets,
        named_ranges: params.named_ranges,
    };
    let created = state.backend().create_spreadsheet(&body).await?;

    Ok(format!(
        "Spreadsheet created successfully. ID: {id}\nTitle: {title}\nURL: {url}",
        id = created.id(),
        title = created.title(),
        url = edit_url(created.id()),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetSpreadsheetParams {
    /// The ID of the spreadsheet to retrieve
    pub spreadsheet_id: String,
    /// The ranges to retrieve from the spreadsheet
    pub ranges: Option<Vec<String>>,
    /// True if grid data should be returned
    pub include_grid_data: Option<bool>,
}

pub async fn get_spreadsheet(state: Arc<AppState>, params: GetSpreadsheetParams) -> Result<String> {
    let query = GetSpreadsheetQuery {
        ranges: params.ranges.unwrap_or_default(),
        include_grid_data: params.include_grid_data,
    };
    let spreadsheet = state
        .backend()
        .get_spreadsheet(&params.spreadsheet_id, &query)
        .await?;

    Ok(format!(
        "Spreadsheet details:\nID: {id}\nTitle: {title}\nSheets: {sheets}\nURL: {url}",
        id = spreadsheet.id(),
        title = spreadsheet.title(),
        sheets = spreadsheet.sheet_titles().join(", "),
        url = edit_url(spreadsheet.id()),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchUpdateParams {
    /// The ID of the spreadsheet to update
    pub spreadsheet_id: String,
    /// A list of updates to apply to the spreadsheet, applied in order as one transaction
    pub requests: Vec<Value>,
    /// Determines if the update response should include the spreadsheet resource
    pub include_spreadsheet_in_response: Option<bool>,
    /// Limits the ranges included in the response spreadsheet
    pub response_ranges: Option<Vec<String>>,
    /// True if grid data should be returned
    pub response_include_grid_data: Option<bool>,
}

pub async fn batch_update(state: Arc<AppState>, params: BatchUpdateParams) -> Result<String> {
    let applied = params.requests.len();
    let body = BatchUpdateSpreadsheetRequest {
        requests: params.requests,
        include_spreadsheet_in_response: params.include_spreadsheet_in_response,
        response_ranges: params.response_ranges,
        response_include_grid_data: params.response_include_grid_data,
    };
    let response = state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    let replies = match response.replies {
        Some(replies) => Value::Array(replies),
        None => json!({}),
    };
    Ok(format!(
        "Batch update completed successfully.\nSpreadsheet ID: {}\nUpdates applied: {}\nResponse: {}",
        params.spreadsheet_id,
        applied,
        serde_json::to_string_pretty(&replies)?,
    ))
}
