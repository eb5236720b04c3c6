use crate::errors::InvalidParamsError;
use crate::model::{
    BatchUpdateSpreadsheetRequest, DeveloperMetadata, DeveloperMetadataLocation, DimensionRange,
    GridRange, Request, SearchDeveloperMetadataRequest,
};
use crate::render::{NO_DEVELOPER_METADATA, metadata_items, or_unknown};
use crate::state::AppState;
use crate::tools::param_enums::MetadataVisibility;
use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const CREATE_TOOL: &str = "createDeveloperMetadata";

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetDeveloperMetadataParams {
    /// The ID of the spreadsheet to retrieve metadata from
    pub spreadsheet_id: String,
}

pub async fn get_developer_metadata(
    state: Arc<AppState>,
    params: GetDeveloperMetadataParams,
) -> Result<String> {
    let response = state
        .backend()
        .search_developer_metadata(
            &params.spreadsheet_id,
            &SearchDeveloperMetadataRequest::match_all(),
        )
        .await?;

    let matched = response.matched_developer_metadata;
    if matched.is_empty() {
        return Ok(NO_DEVELOPER_METADATA.to_string());
    }
    Ok(format!(
        "Found {} developer metadata items:\n\n{}",
        matched.len(),
        metadata_items(&matched)
    ))
}

/// Where a new metadata entry is attached. Each kind carries exactly the
/// coordinates it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataLocation {
    /// The whole spreadsheet
    Spreadsheet,
    /// One sheet
    #[serde(rename_all = "camelCase")]
    Sheet { sheet_id: i32 },
    /// A single row of a sheet
    #[serde(rename_all = "camelCase")]
    Row { sheet_id: i32, row_index: i32 },
    /// A single column of a sheet
    #[serde(rename_all = "camelCase")]
    Column { sheet_id: i32, column_index: i32 },
    /// A single cell of a sheet
    #[serde(rename_all = "camelCase")]
    Cell {
        sheet_id: i32,
        row_index: i32,
        column_index: i32,
    },
}

fn one_past(index: i32, field: &'static str) -> Result<i32, InvalidParamsError> {
    if index < 0 {
        return Err(InvalidParamsError::new(CREATE_TOOL, format!("{field} must not be negative"))
            .at(field));
    }
    index
        .checked_add(1)
        .ok_or_else(|| InvalidParamsError::new(CREATE_TOOL, format!("{field} is too large")).at(field))
}

impl MetadataLocation {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "SPREADSHEET",
            Self::Sheet { .. } => "SHEET",
            Self::Row { .. } => "ROW",
            Self::Column { .. } => "COLUMN",
            Self::Cell { .. } => "CELL",
        }
    }

    /// Rows, columns and cells become half-open ranges one index wide.
    pub fn to_remote(self) -> Result<DeveloperMetadataLocation, InvalidParamsError> {
        let location = match self {
            Self::Spreadsheet => DeveloperMetadataLocation {
                spreadsheet: Some(true),
                ..DeveloperMetadataLocation::default()
            },
            Self::Sheet { sheet_id } => DeveloperMetadataLocation {
                sheet_id: Some(sheet_id),
                ..DeveloperMetadataLocation::default()
            },
            Self::Row {
                sheet_id,
                row_index,
            } => DeveloperMetadataLocation {
                dimension_range: Some(DimensionRange {
                    sheet_id: Some(sheet_id),
                    dimension: Some("ROWS".to_string()),
                    start_index: Some(row_index),
                    end_index: Some(one_past(row_index, "location.rowIndex")?),
                }),
                ..DeveloperMetadataLocation::default()
            },
            Self::Column {
                sheet_id,
                column_index,
            } => DeveloperMetadataLocation {
                dimension_range: Some(DimensionRange {
                    sheet_id: Some(sheet_id),
                    dimension: Some("COLUMNS".to_string()),
                    start_index: Some(column_index),
                    end_index: Some(one_past(column_index, "location.columnIndex")?),
                }),
                ..DeveloperMetadataLocation::default()
            },
            Self::Cell {
                sheet_id,
                row_index,
                column_index,
            } => DeveloperMetadataLocation {
                grid_range: Some(GridRange {
                    sheet_id: Some(sheet_id),
                    start_row_index: Some(row_index),
                    end_row_index: Some(one_past(row_index, "location.rowIndex")?),
                    start_column_index: Some(column_index),
                    end_column_index: Some(one_past(column_index, "location.columnIndex")?),
                }),
                ..DeveloperMetadataLocation::default()
            },
        };
        Ok(location)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDeveloperMetadataParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The key of the developer metadata
    pub metadata_key: String,
    /// The value of the developer metadata
    pub metadata_value: String,
    /// The location where the metadata should be created
    pub location: MetadataLocation,
    /// The visibility of the developer metadata
    #[serde(default)]
    pub visibility: MetadataVisibility,
}

pub async fn create_developer_metadata(
    state: Arc<AppState>,
    params: CreateDeveloperMetadataParams,
) -> Result<String> {
    let developer_metadata = DeveloperMetadata {
        metadata_key: Some(params.metadata_key.clone()),
        metadata_value: Some(params.metadata_value.clone()),
        location: Some(params.location.to_remote()?),
        visibility: Some(params.visibility),
        ..DeveloperMetadata::default()
    };
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![
        Request::CreateDeveloperMetadata { developer_metadata },
    ])?;
    let response = state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    let created = response
        .first_reply()?
        .create_developer_metadata
        .ok_or_else(|| anyhow!("batch update reply carried no createDeveloperMetadata result"))?
        .developer_metadata;

    Ok(format!(
        "Developer metadata created successfully.\nSpreadsheet ID: {}\nMetadata ID: {}\nKey: {}\nValue: {}\nLocation Type: {}",
        params.spreadsheet_id,
        or_unknown(created.metadata_id),
        params.metadata_key,
        params.metadata_value,
        params.location.kind(),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDeveloperMetadataParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The ID of the metadata to update
    pub metadata_id: i32,
    /// The new key for the metadata
    pub metadata_key: Option<String>,
    /// The new value for the metadata
    pub metadata_value: Option<String>,
    /// The new visibility for the metadata
    pub visibility: Option<MetadataVisibility>,
}

impl UpdateDeveloperMetadataParams {
    pub fn to_update(&self) -> (DeveloperMetadata, Vec<&'static str>) {
        let mut fields = Vec::new();
        if self.metadata_key.is_some() {
            fields.push("metadataKey");
        }
        if self.metadata_value.is_some() {
            fields.push("metadataValue");
        }
        if self.visibility.is_some() {
            fields.push("visibility");
        }
        let metadata = DeveloperMetadata {
            metadata_id: Some(self.metadata_id),
            metadata_key: self.metadata_key.clone(),
            metadata_value: self.metadata_value.clone(),
            visibility: self.visibility,
            ..DeveloperMetadata::default()
        };
        (metadata, fields)
    }
}

pub async fn update_developer_metadata(
    state: Arc<AppState>,
    params: UpdateDeveloperMetadataParams,
) -> Result<String> {
    let (developer_metadata, fields) = params.to_update();
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![
        Request::UpdateDeveloperMetadata {
            developer_metadata,
            fields: fields.join(","),
        },
    ])?;
    state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    Ok(format!(
        "Developer metadata updated successfully.\nSpreadsheet ID: {}\nMetadata ID: {}\nUpdated fields: {}",
        params.spreadsheet_id,
        params.metadata_id,
        fields.join(", "),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteDeveloperMetadataParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The ID of the metadata to delete
    pub metadata_id: i32,
}

pub async fn delete_developer_metadata(
    state: Arc<AppState>,
    params: DeleteDeveloperMetadataParams,
) -> Result<String> {
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![
        Request::DeleteDeveloperMetadata {
            developer_id: params.metadata_id,
        },
    ])?;
    state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    Ok(format!(
        "Developer metadata deleted successfully.\nSpreadsheet ID: {}\nMetadata ID: {}",
        params.spreadsheet_id, params.metadata_id
    ))
}
