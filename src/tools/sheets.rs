use crate::model::{BatchUpdateSpreadsheetRequest, GridProperties, Request, SheetProperties};
use crate::render::or_unknown;
use crate::state::AppState;
use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_ROW_COUNT: i32 = 1000;
const DEFAULT_COLUMN_COUNT: i32 = 26;

fn default_row_count() -> i32 {
    DEFAULT_ROW_COUNT
}

fn default_column_count() -> i32 {
    DEFAULT_COLUMN_COUNT
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CopySheetParams {
    /// The ID of the spreadsheet containing the sheet to copy
    pub spreadsheet_id: String,
    /// The ID of the sheet to copy
    pub sheet_id: i32,
    /// The ID of the spreadsheet to copy the sheet to
    pub destination_spreadsheet_id: String,
}

pub async fn copy_sheet(state: Arc<AppState>, params: CopySheetParams) -> Result<String> {
    let copied = state
        .backend()
        .copy_sheet_to(
            &params.spreadsheet_id,
            params.sheet_id,
            &params.destination_spreadsheet_id,
        )
        .await?;

    Ok(format!(
        "Sheet copied successfully.\nSource Spreadsheet ID: {}\nSource Sheet ID: {}\nDestination Spreadsheet ID: {}\nNew Sheet ID: {}\nNew Sheet Index: {}",
        params.spreadsheet_id,
        params.sheet_id,
        params.destination_spreadsheet_id,
        or_unknown(copied.sheet_id),
        or_unknown(copied.index),
    ))
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddSheetParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The name of the new sheet
    pub title: String,
    /// The zero-based index where the new sheet should be inserted
    pub index: Option<i32>,
    /// The number of rows in the new sheet
    #[serde(default = "default_row_count")]
    pub row_count: i32,
    /// The number of columns in the new sheet
    #[serde(default = "default_column_count")]
    pub column_count: i32,
}

pub async fn add_sheet(state: Arc<AppState>, params: AddSheetParams) -> Result<String> {
    let request = Request::AddSheet {
        properties: SheetProperties {
            title: Some(params.title),
            index: params.index,
            grid_properties: Some(GridProperties {
                row_count: Some(params.row_count),
                column_count: Some(params.column_count),
                ..GridProperties::default()
            }),
            ..SheetProperties::default()
        },
    };
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![request])?;
    let response = state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    let added = response
        .first_reply()?
        .add_sheet
        .ok_or_else(|| anyhow!("batch update reply carried no addSheet result"))?
        .properties;
    let grid = added.grid_properties.unwrap_or_default();

    Ok(format!(
        "Sheet added successfully.\nSpreadsheet ID: {}\nNew Sheet Title: {}\nNew Sheet ID: {}\nDimensions: {} rows x {} columns",
        params.spreadsheet_id,
        or_unknown(added.title.as_deref()),
        or_unknown(added.sheet_id),
        or_unknown(grid.row_count),
        or_unknown(grid.column_count),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteSheetParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The ID of the sheet to delete
    pub sheet_id: i32,
}

pub async fn delete_sheet(state: Arc<AppState>, params: DeleteSheetParams) -> Result<String> {
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![Request::DeleteSheet {
        sheet_id: params.sheet_id,
    }])?;
    state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    Ok(format!(
        "Sheet deleted successfully.\nSpreadsheet ID: {}\nDeleted Sheet ID: {}",
        params.spreadsheet_id, params.sheet_id
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSheetPropertiesParams {
    /// The ID of the spreadsheet
    pub spreadsheet_id: String,
    /// The ID of the sheet to update
    pub sheet_id: i32,
    /// The new title for the sheet
    pub title: Option<String>,
    /// The new index for the sheet
    pub index: Option<i32>,
    /// Whether the sheet should be hidden
    pub hidden: Option<bool>,
    /// Whether the sheet is displayed right-to-left
    pub right_to_left: Option<bool>,
    /// Grid properties to update
    pub grid_properties: Option<GridProperties>,
}

impl UpdateSheetPropertiesParams {
    /// The properties payload plus the names of the fields actually supplied.
    /// `sheetId` identifies the sheet and never appears in the mask.
    pub fn to_update(&self) -> (SheetProperties, Vec<&'static str>) {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.index.is_some() {
            fields.push("index");
        }
        if self.hidden.is_some() {
            fields.push("hidden");
        }
        if self.right_to_left.is_some() {
            fields.push("rightToLeft");
        }
        if self.grid_properties.is_some() {
            fields.push("gridProperties");
        }

        let properties = SheetProperties {
            sheet_id: Some(self.sheet_id),
            title: self.title.clone(),
            index: self.index,
            hidden: self.hidden,
            right_to_left: self.right_to_left,
            grid_properties: self.grid_properties.clone(),
            ..SheetProperties::default()
        };
        (properties, fields)
    }
}

pub async fn update_sheet_properties(
    state: Arc<AppState>,
    params: UpdateSheetPropertiesParams,
) -> Result<String> {
    let (properties, fields) = params.to_update();
    let body = BatchUpdateSpreadsheetRequest::from_requests(vec![
        Request::UpdateSheetProperties {
            properties,
            fields: fields.join(","),
        },
    ])?;
    state
        .backend()
        .batch_update(&params.spreadsheet_id, &body)
        .await?;

    Ok(format!(
        "Sheet properties updated successfully.\nSpreadsheet ID: {}\nSheet ID: {}\nUpdated properties: {}",
        params.spreadsheet_id,
        params.sheet_id,
        fields.join(", "),
    ))
}
