use crate::model::{AppendOptions, BatchUpdateValuesRequest, ValueRange, ValuesReadOptions};
use crate::render::{NO_DATA_IN_RANGE, NO_DATA_IN_THIS_RANGE, or_unknown, tabulate};
use crate::state::AppState;
use crate::tools::param_enums::{
    InsertDataOption, MajorDimension, ValueInputOption, ValueRenderOption,
};
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetValuesParams {
    /// The ID of the spreadsheet to retrieve data from
    pub spreadsheet_id: String,
    /// The A1 notation or R1C1 notation of the range to retrieve values from
    pub range: String,
    /// The major dimension that results should use
    #[serde(default)]
    pub major_dimension: MajorDimension,
    /// How values should be represented in the output
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

pub async fn get_values(state: Arc<AppState>, params: GetValuesParams) -> Result<String> {
    let options = ValuesReadOptions {
        major_dimension: Some(params.major_dimension),
        value_render_option: Some(params.value_render_option),
    };
    let response = state
        .backend()
        .get_values(&params.spreadsheet_id, &params.range, options)
        .await?;

    let body = match tabulate(&response.values) {
        Some(grid) => format!(
            "Data ({} {}):\n{grid}",
            response.values.len(),
            params.major_dimension.as_str().to_lowercase(),
        ),
        None => NO_DATA_IN_RANGE.to_string(),
    };
    Ok(format!("Retrieved values from {}:\n{body}", params.range))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateValuesParams {
    /// The ID of the spreadsheet to update
    pub spreadsheet_id: String,
    /// The A1 notation of the values to update
    pub range: String,
    /// The data to write
    pub values: Vec<Vec<Value>>,
    /// The major dimension of the values
    #[serde(default)]
    pub major_dimension: MajorDimension,
    /// How the input data should be interpreted
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

pub async fn update_values(state: Arc<AppState>, params: UpdateValuesParams) -> Result<String> {
    let body = ValueRange {
        range: Some(params.range.clone()),
        major_dimension: Some(params.major_dimension),
        values: params.values,
    };
    let response = state
        .backend()
        .update_values(
            &params.spreadsheet_id,
            &params.range,
            params.value_input_option,
            &body,
        )
        .await?;

    Ok(format!(
        "Values updated successfully.\nSpreadsheet ID: {}\nRange: {}\nUpdated cells: {}\nUpdated rows: {}\nUpdated columns: {}",
        params.spreadsheet_id,
        or_unknown(response.updated_range.as_deref()),
        or_unknown(response.updated_cells),
        or_unknown(response.updated_rows),
        or_unknown(response.updated_columns),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppendValuesParams {
    /// The ID of the spreadsheet to append data to
    pub spreadsheet_id: String,
    /// The A1 notation of the table to append to
    pub range: String,
    /// The data to append
    pub values: Vec<Vec<Value>>,
    /// The major dimension of the values
    #[serde(default)]
    pub major_dimension: MajorDimension,
    /// How the input data should be interpreted
    #[serde(default)]
    pub value_input_option: ValueInputOption,
    /// How the input data should be inserted
    #[serde(default)]
    pub insert_data_option: InsertDataOption,
}

pub async fn append_values(state: Arc<AppState>, params: AppendValuesParams) -> Result<String> {
    let body = ValueRange {
        range: Some(params.range.clone()),
        major_dimension: Some(params.major_dimension),
        values: params.values,
    };
    let options = AppendOptions {
        value_input_option: params.value_input_option,
        insert_data_option: params.insert_data_option,
    };
    let response = state
        .backend()
        .append_values(&params.spreadsheet_id, &params.range, options, &body)
        .await?;

    let updates = response.updates.unwrap_or_default();
    Ok(format!(
        "Values appended successfully.\nSpreadsheet ID: {}\nRange: {}\nUpdated cells: {}\nUpdated rows: {}\nUpdated columns: {}",
        params.spreadsheet_id,
        or_unknown(updates.updated_range.as_deref()),
        or_unknown(updates.updated_cells),
        or_unknown(updates.updated_rows),
        or_unknown(updates.updated_columns),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClearValuesParams {
    /// The ID of the spreadsheet to clear
    pub spreadsheet_id: String,
    /// The A1 notation of the values to clear
    pub range: String,
}

pub async fn clear_values(state: Arc<AppState>, params: ClearValuesParams) -> Result<String> {
    let response = state
        .backend()
        .clear_values(&params.spreadsheet_id, &params.range)
        .await?;

    Ok(format!(
        "Values cleared successfully.\nSpreadsheet ID: {}\nRange: {}",
        params.spreadsheet_id,
        or_unknown(response.cleared_range.as_deref()),
    ))
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchGetValuesParams {
    /// The ID of the spreadsheet to retrieve data from
    pub spreadsheet_id: String,
    /// The A1 notation of the ranges to retrieve values from
    pub ranges: Vec<String>,
    /// The major dimension that results should use
    #[serde(default)]
    pub major_dimension: MajorDimension,
    /// How values should be represented in the output
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

pub async fn batch_get_values(
    state: Arc<AppState>,
    params: BatchGetValuesParams,
) -> Result<String> {
    let options = ValuesReadOptions {
        major_dimension: Some(params.major_dimension),
        value_render_option: Some(params.value_render_option),
    };
    let response = state
        .backend()
        .batch_get_values(&params.spreadsheet_id, &params.ranges, options)
        .await?;

    let mut text = format!("Retrieved values from {} ranges:\n\n", params.ranges.len());
    for (i, value_range) in response.value_ranges.iter().enumerate() {
        text.push_str(&format!(
            "Range {} ({}):\n",
            i + 1,
            or_unknown(value_range.range.as_deref())
        ));
        match tabulate(&value_range.values) {
            Some(grid) => text.push_str(&grid),
            None => text.push_str(NO_DATA_IN_THIS_RANGE),
        }
        text.push_str("\n\n");
    }
    Ok(text.trim().to_string())
}

/// One target range of a `batchUpdateValues` call.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RangeData {
    /// The A1 notation of the values to update
    pub range: String,
    /// The data to write
    pub values: Vec<Vec<Value>>,
    /// The major dimension of the values
    pub major_dimension: Option<MajorDimension>,
}

impl From<RangeData> for ValueRange {
    fn from(data: RangeData) -> Self {
        ValueRange {
            range: Some(data.range),
            major_dimension: data.major_dimension,
            values: data.values,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BatchUpdateValuesParams {
    /// The ID of the spreadsheet to update
    pub spreadsheet_id: String,
    /// The data to write to multiple ranges
    pub data: Vec<RangeData>,
    /// How the input data should be interpreted
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

pub async fn batch_update_values(
    state: Arc<AppState>,
    params: BatchUpdateValuesParams,
) -> Result<String> {
    let body = BatchUpdateValuesRequest {
        value_input_option: params.value_input_option,
        data: params.data.into_iter().map(ValueRange::from).collect(),
    };
    let response = state
        .backend()
        .batch_update_values(&params.spreadsheet_id, &body)
        .await?;

    Ok(format!(
        "Batch update completed successfully.\nSpreadsheet ID: {}\nTotal updated cells: {}\nTotal updated ranges: {}\nTotal updated rows: {}\nTotal updated columns: {}",
        params.spreadsheet_id,
        or_unknown(response.total_updated_cells),
        response.responses.len(),
        or_unknown(response.total_updated_rows),
        or_unknown(response.total_updated_columns),
    ))
}
