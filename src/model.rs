//! Wire shapes of the Sheets v4 REST API.
//!
//! Only the fields the catalogue reads or writes are modelled. Everything the
//! server passes through untouched (user supplied batch requests, replies,
//! formats) stays a [`serde_json::Value`].

use crate::tools::param_enums::{
    InsertDataOption, MajorDimension, MetadataVisibility, ValueInputOption, ValueRenderOption,
};
use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use serde_with::skip_serializing_none;

pub fn edit_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    pub title: Option<String>,
    pub locale: Option<String>,
    pub auto_recalc: Option<String>,
    pub time_zone: Option<String>,
    pub default_format: Option<Value>,
    pub iterative_calculation_settings: Option<Value>,
    pub spreadsheet_theme: Option<Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: Option<String>,
    pub properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    pub spreadsheet_url: Option<String>,
}

impl Spreadsheet {
    pub fn id(&self) -> &str {
        self.spreadsheet_id.as_deref().unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|p| p.title.as_deref())
            .unwrap_or_default()
    }

    pub fn sheet_titles(&self) -> Vec<&str> {
        self.sheets
            .iter()
            .filter_map(|sheet| sheet.properties.as_ref())
            .map(|props| props.title.as_deref().unwrap_or_default())
            .collect()
    }

    /// Title comparison ignores case.
    pub fn find_sheet(&self, name: &str) -> Option<&SheetProperties> {
        let wanted = name.to_lowercase();
        self.sheets
            .iter()
            .filter_map(|sheet| sheet.properties.as_ref())
            .find(|props| {
                props
                    .title
                    .as_deref()
                    .is_some_and(|title| title.to_lowercase() == wanted)
            })
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub properties: Option<SheetProperties>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: Option<i32>,
    pub title: Option<String>,
    pub index: Option<i32>,
    pub sheet_type: Option<String>,
    pub grid_properties: Option<GridProperties>,
    pub hidden: Option<bool>,
    pub right_to_left: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridProperties {
    pub row_count: Option<i32>,
    pub column_count: Option<i32>,
    pub frozen_row_count: Option<i32>,
    pub frozen_column_count: Option<i32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpreadsheetRequest {
    pub properties: Option<SpreadsheetProperties>,
    pub sheets: Option<Vec<Value>>,
    pub named_ranges: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetSpreadsheetQuery {
    pub ranges: Vec<String>,
    pub include_grid_data: Option<bool>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetRequest {
    pub requests: Vec<Value>,
    pub include_spreadsheet_in_response: Option<bool>,
    pub response_ranges: Option<Vec<String>>,
    pub response_include_grid_data: Option<bool>,
}

impl BatchUpdateSpreadsheetRequest {
    pub fn from_requests(requests: Vec<Request>) -> Result<Self> {
        let requests = requests
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            requests,
            ..Self::default()
        })
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetResponse {
    pub spreadsheet_id: Option<String>,
    pub replies: Option<Vec<Value>>,
    pub updated_spreadsheet: Option<Value>,
}

impl BatchUpdateSpreadsheetResponse {
    pub fn first_reply(&self) -> Result<Reply> {
        let reply = self
            .replies
            .as_ref()
            .and_then(|replies| replies.first())
            .ok_or_else(|| anyhow!("batch update returned no replies"))?;
        Ok(serde_json::from_value(reply.clone())?)
    }
}

/// The update requests this server builds itself. User supplied requests for
/// `batchUpdate` bypass this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    AddSheet {
        properties: SheetProperties,
    },
    DeleteSheet {
        sheet_id: i32,
    },
    UpdateSheetProperties {
        properties: SheetProperties,
        fields: String,
    },
    CreateDeveloperMetadata {
        developer_metadata: DeveloperMetadata,
    },
    UpdateDeveloperMetadata {
        developer_metadata: DeveloperMetadata,
        fields: String,
    },
    DeleteDeveloperMetadata {
        developer_id: i32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub add_sheet: Option<AddSheetReply>,
    pub create_developer_metadata: Option<CreateDeveloperMetadataReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSheetReply {
    #[serde(default)]
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeveloperMetadataReply {
    #[serde(default)]
    pub developer_metadata: DeveloperMetadata,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: Option<String>,
    pub major_dimension: Option<MajorDimension>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValuesReadOptions {
    pub major_dimension: Option<MajorDimension>,
    pub value_render_option: Option<ValueRenderOption>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOptions {
    pub value_input_option: ValueInputOption,
    pub insert_data_option: InsertDataOption,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub updated_range: Option<String>,
    pub updated_rows: Option<i64>,
    pub updated_columns: Option<i64>,
    pub updated_cells: Option<i64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub table_range: Option<String>,
    pub updates: Option<UpdateValuesResponse>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub cleared_range: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesResponse {
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: ValueInputOption,
    pub data: Vec<ValueRange>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    pub spreadsheet_id: Option<String>,
    pub total_updated_rows: Option<i64>,
    pub total_updated_columns: Option<i64>,
    pub total_updated_cells: Option<i64>,
    pub total_updated_sheets: Option<i64>,
    #[serde(default)]
    pub responses: Vec<Value>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperMetadata {
    pub metadata_id: Option<i32>,
    pub metadata_key: Option<String>,
    pub metadata_value: Option<String>,
    pub location: Option<DeveloperMetadataLocation>,
    pub visibility: Option<MetadataVisibility>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperMetadataLocation {
    pub location_type: Option<String>,
    pub spreadsheet: Option<bool>,
    pub sheet_id: Option<i32>,
    pub dimension_range: Option<DimensionRange>,
    pub grid_range: Option<GridRange>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: Option<i32>,
    pub dimension: Option<String>,
    pub start_index: Option<i32>,
    pub end_index: Option<i32>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    pub sheet_id: Option<i32>,
    pub start_row_index: Option<i32>,
    pub end_row_index: Option<i32>,
    pub start_column_index: Option<i32>,
    pub end_column_index: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDeveloperMetadataRequest {
    pub data_filters: Vec<Value>,
}

impl SearchDeveloperMetadataRequest {
    /// A single empty filter matches every metadata entry in the document.
    pub fn match_all() -> Self {
        Self {
            data_filters: vec![json!({})],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDeveloperMetadataResponse {
    #[serde(default)]
    pub matched_developer_metadata: Vec<MatchedDeveloperMetadata>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedDeveloperMetadata {
    pub developer_metadata: Option<DeveloperMetadata>,
    #[serde(default)]
    pub data_filters: Vec<Value>,
}
