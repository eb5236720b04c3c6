//! Read-only views of a spreadsheet addressed by `sheets://` URIs.

pub mod template;

use crate::envelope::ResourceEnvelope;
use crate::model::{GetSpreadsheetQuery, SearchDeveloperMetadataRequest, ValuesReadOptions, edit_url};
use crate::render::{NO_DEVELOPER_METADATA, metadata_items, no_data_in_named_range, or_unknown, tabulate};
use crate::state::AppState;
use crate::tools::param_enums::ValueRenderOption;
use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use template::UriTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Spreadsheet,
    Sheet,
    Values,
    Metadata,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Sheet => "sheet",
            Self::Values => "values",
            Self::Metadata => "metadata",
        }
    }
}

pub struct ResourceDescriptor {
    pub kind: ResourceKind,
    pub description: &'static str,
    pub template: UriTemplate,
}

const TEMPLATES: [(ResourceKind, &str, &str); 4] = [
    (
        ResourceKind::Spreadsheet,
        "sheets://spreadsheet/{spreadsheetId}",
        "Spreadsheet summary: title, URL, sheet names, locale and time zone",
    ),
    (
        ResourceKind::Sheet,
        "sheets://spreadsheet/{spreadsheetId}/sheet/{sheetName}",
        "Properties of one sheet, looked up by title ignoring case",
    ),
    (
        ResourceKind::Values,
        "sheets://spreadsheet/{spreadsheetId}/values/{range}",
        "Formatted cell values of a range as tab separated rows",
    ),
    (
        ResourceKind::Metadata,
        "sheets://spreadsheet/{spreadsheetId}/metadata",
        "All developer metadata attached to the spreadsheet",
    ),
];

static CATALOGUE: Lazy<Vec<ResourceDescriptor>> = Lazy::new(|| {
    TEMPLATES
        .iter()
        .filter_map(|(kind, template, description)| {
            match UriTemplate::parse(*template) {
                Ok(template) => Some(ResourceDescriptor {
                    kind: *kind,
                    description: *description,
                    template,
                }),
                Err(error) => {
                    tracing::error!(?error, "skipping resource template");
                    None
                }
            }
        })
        .collect()
});

pub fn catalogue() -> &'static [ResourceDescriptor] {
    &CATALOGUE
}

/// Resolves `uri` against the catalogue. `None` when no template matches.
pub async fn read(state: Arc<AppState>, uri: &str) -> Option<ResourceEnvelope> {
    let (kind, params) = catalogue().iter().find_map(|descriptor| {
        descriptor
            .template
            .extract(uri)
            .map(|params| (descriptor.kind, params))
    })?;

    tracing::info!(resource = kind.name(), uri = uri, "resource read requested");
    let result = match kind {
        ResourceKind::Spreadsheet => spreadsheet(&state, uri, &params).await,
        ResourceKind::Sheet => sheet(&state, uri, &params).await,
        ResourceKind::Values => values(&state, uri, &params).await,
        ResourceKind::Metadata => metadata(&state, uri, &params).await,
    };

    Some(result.unwrap_or_else(|error| {
        tracing::error!(resource = kind.name(), uri = uri, ?error, "resource read failed");
        ResourceEnvelope::error(uri, format!("Error fetching {}: {error}", kind.name()))
    }))
}

fn param<'a>(params: &'a IndexMap<String, String>, name: &str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("uri is missing {name}"))
}

fn summary_query() -> GetSpreadsheetQuery {
    GetSpreadsheetQuery {
        ranges: Vec::new(),
        include_grid_data: Some(false),
    }
}

async fn spreadsheet(
    state: &AppState,
    uri: &str,
    params: &IndexMap<String, String>,
) -> Result<ResourceEnvelope> {
    let id = param(params, "spreadsheetId")?;
    let data = state.backend().get_spreadsheet(id, &summary_query()).await?;
    let props = data.properties.clone().unwrap_or_default();

    let text = format!(
        "Spreadsheet: {}\nID: {}\nURL: {}\nSheets: {}\nLocale: {}\nTime Zone: {}",
        data.title(),
        data.id(),
        edit_url(data.id()),
        data.sheet_titles().join(", "),
        props.locale.as_deref().unwrap_or("Not specified"),
        props.time_zone.as_deref().unwrap_or("Not specified"),
    );
    Ok(ResourceEnvelope::text(uri, text))
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) { "Yes" } else { "No" }
}

async fn sheet(
    state: &AppState,
    uri: &str,
    params: &IndexMap<String, String>,
) -> Result<ResourceEnvelope> {
    let id = param(params, "spreadsheetId")?;
    let name = param(params, "sheetName")?;
    let data = state.backend().get_spreadsheet(id, &summary_query()).await?;

    let Some(props) = data.find_sheet(name) else {
        return Ok(ResourceEnvelope::error(
            uri,
            format!("Sheet \"{name}\" not found in spreadsheet."),
        ));
    };
    let grid = props.grid_properties.clone().unwrap_or_default();
    let count = |value: Option<i32>| value.map_or_else(|| "Unknown".to_string(), |v| v.to_string());

    let text = format!(
        "Sheet: {}\nSheet ID: {}\nIndex: {}\nRow Count: {}\nColumn Count: {}\nFrozen Rows: {}\nFrozen Columns: {}\nHidden: {}\nRight-to-Left: {}",
        props.title.as_deref().unwrap_or_default(),
        or_unknown(props.sheet_id),
        or_unknown(props.index),
        count(grid.row_count),
        count(grid.column_count),
        grid.frozen_row_count.unwrap_or(0),
        grid.frozen_column_count.unwrap_or(0),
        yes_no(props.hidden),
        yes_no(props.right_to_left),
    );
    Ok(ResourceEnvelope::text(uri, text))
}

async fn values(
    state: &AppState,
    uri: &str,
    params: &IndexMap<String, String>,
) -> Result<ResourceEnvelope> {
    let id = param(params, "spreadsheetId")?;
    let range = param(params, "range")?;
    let options = ValuesReadOptions {
        major_dimension: None,
        value_render_option: Some(ValueRenderOption::FormattedValue),
    };
    let response = state.backend().get_values(id, range, options).await?;

    let text = match tabulate(&response.values) {
        Some(grid) => format!("Values in range \"{range}\":\n\n{grid}"),
        None => no_data_in_named_range(range),
    };
    Ok(ResourceEnvelope::text(uri, text))
}

async fn metadata(
    state: &AppState,
    uri: &str,
    params: &IndexMap<String, String>,
) -> Result<ResourceEnvelope> {
    let id = param(params, "spreadsheetId")?;
    let response = state
        .backend()
        .search_developer_metadata(id, &SearchDeveloperMetadataRequest::match_all())
        .await?;

    let matched = response.matched_developer_metadata;
    if matched.is_empty() {
        return Ok(ResourceEnvelope::text(uri, NO_DEVELOPER_METADATA));
    }
    let text = format!(
        "Developer Metadata for Spreadsheet {id}:\n\n{}",
        metadata_items(&matched)
    );
    Ok(ResourceEnvelope::text(uri, text))
}
