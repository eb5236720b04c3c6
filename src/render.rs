use crate::model::{DeveloperMetadata, MatchedDeveloperMetadata};
use serde_json::Value;

pub const NO_DATA_IN_RANGE: &str = "No data found in the specified range.";
pub const NO_DATA_IN_THIS_RANGE: &str = "No data found in this range.";
pub const NO_DEVELOPER_METADATA: &str = "No developer metadata found in this spreadsheet.";

pub fn no_data_in_named_range(range: &str) -> String {
    format!("No data found in range \"{range}\".")
}

pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Tab separated cells, newline separated rows. `None` for an empty grid so
/// every caller picks its own "no data" wording.
pub fn tabulate(values: &[Vec<Value>]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    let rows = values
        .iter()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>().join("\t"))
        .collect::<Vec<_>>();
    Some(rows.join("\n"))
}

pub fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn location_line(metadata: &DeveloperMetadata) -> Option<String> {
    let location = metadata.location.as_ref()?;
    if location.spreadsheet == Some(true) {
        return Some("Spreadsheet level".to_string());
    }
    if let Some(sheet_id) = location.sheet_id {
        return Some(format!("Sheet (ID: {sheet_id})"));
    }
    if let Some(range) = location.dimension_range.as_ref() {
        return Some(format!(
            "Dimension Range (Sheet ID: {}, Dimension: {}, Start: {}, End: {})",
            or_unknown(range.sheet_id),
            or_unknown(range.dimension.as_deref()),
            or_unknown(range.start_index),
            or_unknown(range.end_index),
        ));
    }
    let grid = location.grid_range.as_ref()?;
    Some(format!(
        "Grid Range (Sheet ID: {}, Rows: {}-{}, Columns: {}-{})",
        or_unknown(grid.sheet_id),
        or_unknown(grid.start_row_index),
        or_unknown(grid.end_row_index),
        or_unknown(grid.start_column_index),
        or_unknown(grid.end_column_index),
    ))
}

/// Numbered blocks, one per matched entry, separated by blank lines.
pub fn metadata_items(items: &[MatchedDeveloperMetadata]) -> String {
    let empty = DeveloperMetadata::default();
    let blocks = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let metadata = item.developer_metadata.as_ref().unwrap_or(&empty);
            let mut lines = vec![
                format!("Metadata {}:", i + 1),
                format!("- ID: {}", or_unknown(metadata.metadata_id)),
                format!("- Key: {}", or_unknown(metadata.metadata_key.as_deref())),
                format!("- Value: {}", or_unknown(metadata.metadata_value.as_deref())),
                format!("- Visibility: {}", or_unknown(metadata.visibility)),
            ];
            if let Some(line) = location_line(metadata) {
                lines.push(format!("- Location: {line}"));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>();
    blocks.join("\n\n").trim().to_string()
}
