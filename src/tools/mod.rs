pub mod developer_metadata;
pub mod param_enums;
pub mod sheets;
pub mod spreadsheets;
pub mod values;

pub use developer_metadata::{
    CreateDeveloperMetadataParams, DeleteDeveloperMetadataParams, GetDeveloperMetadataParams,
    MetadataLocation, UpdateDeveloperMetadataParams, create_developer_metadata,
    delete_developer_metadata, get_developer_metadata, update_developer_metadata,
};
pub use sheets::{
    AddSheetParams, CopySheetParams, DeleteSheetParams, UpdateSheetPropertiesParams, add_sheet,
    copy_sheet, delete_sheet, update_sheet_properties,
};
pub use spreadsheets::{
    BatchUpdateParams, CreateSpreadsheetParams, GetSpreadsheetParams, batch_update,
    create_spreadsheet, get_spreadsheet,
};
pub use values::{
    AppendValuesParams, BatchGetValuesParams, BatchUpdateValuesParams, ClearValuesParams,
    GetValuesParams, RangeData, UpdateValuesParams, append_values, batch_get_values,
    batch_update_values, clear_values, get_values, update_values,
};

use crate::envelope::{ResultEnvelope, normalize_error};
use crate::errors::InvalidParamsError;
use anyhow::Result;
use std::future::Future;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Subject areas of the tool catalogue. Each one is served by its own router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ToolArea {
    Spreadsheet,
    Sheet,
    Values,
    Metadata,
}

impl ToolArea {
    pub fn tool_names(self) -> &'static [&'static str] {
        match self {
            Self::Spreadsheet => &["createSpreadsheet", "getSpreadsheet", "batchUpdate"],
            Self::Sheet => &[
                "copySheet",
                "addSheet",
                "deleteSheet",
                "updateSheetProperties",
            ],
            Self::Values => &[
                "getValues",
                "updateValues",
                "appendValues",
                "clearValues",
                "batchGetValues",
                "batchUpdateValues",
            ],
            Self::Metadata => &[
                "getDeveloperMetadata",
                "createDeveloperMetadata",
                "updateDeveloperMetadata",
                "deleteDeveloperMetadata",
            ],
        }
    }
}

/// Every tool name in catalogue order.
pub fn catalogue() -> impl Iterator<Item = &'static str> {
    ToolArea::iter().flat_map(|area| area.tool_names().iter().copied())
}

/// Runs one handler and folds its outcome into an envelope. Parameter
/// problems the schema could not express are handed back to the caller
/// as protocol errors instead.
pub async fn invoke<F>(tool: &'static str, fut: F) -> Result<ResultEnvelope, InvalidParamsError>
where
    F: Future<Output = Result<String>>,
{
    match fut.await {
        Ok(text) => Ok(ResultEnvelope::success(text)),
        Err(error) => match error.downcast::<InvalidParamsError>() {
            Ok(invalid) => Err(invalid),
            Err(error) => Ok(normalize_error(tool, error)),
        },
    }
}
