use anyhow::Result;
use serde_json::{Value, json};
use sheets_mcp::backend::ApiError;
use sheets_mcp::tools::{self, invoke};
use std::sync::Arc;

mod support;

use support::{RecordingBackend, app_state, not_found, spreadsheet_body};

fn params<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("valid params")
}

#[tokio::test(flavor = "current_thread")]
async fn create_spreadsheet_reports_id_title_and_url() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "create_spreadsheet",
        json!({ "spreadsheetId": "new-id", "properties": { "title": "Budget" } }),
    ));
    let state = app_state(backend.clone());

    let text = tools::create_spreadsheet(
        state,
        params(json!({ "properties": { "title": "Budget", "locale": "fr_FR" } })),
    )
    .await?;

    assert_eq!(
        text,
        "Spreadsheet created successfully. ID: new-id\nTitle: Budget\nURL: https://docs.google.com/spreadsheets/d/new-id/edit"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "properties": { "title": "Budget", "locale": "fr_FR" } })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn get_spreadsheet_lists_sheet_titles_in_order() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "get_spreadsheet",
        spreadsheet_body(
            "abc",
            "Plan",
            &[json!({ "sheetId": 0, "title": "Sheet1" }), json!({ "sheetId": 9, "title": "Data" })],
        ),
    ));
    let state = app_state(backend.clone());

    let text = tools::get_spreadsheet(
        state,
        params(json!({ "spreadsheetId": "abc", "ranges": ["Data!A1:B2"] })),
    )
    .await?;

    assert_eq!(
        text,
        "Spreadsheet details:\nID: abc\nTitle: Plan\nSheets: Sheet1, Data\nURL: https://docs.google.com/spreadsheets/d/abc/edit"
    );
    let call = backend.last_call();
    assert_eq!(call.spreadsheet_id, "abc");
    assert_eq!(call.payload["ranges"], json!(["Data!A1:B2"]));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn batch_update_prints_replies_or_empty_object() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend.clone());

    let text = tools::batch_update(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "requests": [{ "deleteSheet": { "sheetId": 4 } }, { "deleteSheet": { "sheetId": 5 } }]
        })),
    )
    .await?;

    assert_eq!(
        text,
        "Batch update completed successfully.\nSpreadsheet ID: abc\nUpdates applied: 2\nResponse: {}"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "requests": [{ "deleteSheet": { "sheetId": 4 } }, { "deleteSheet": { "sheetId": 5 } }] })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn add_sheet_sends_default_grid_size_and_reports_the_reply() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "batch_update",
        json!({
            "replies": [{
                "addSheet": {
                    "properties": {
                        "sheetId": 7,
                        "title": "New (1)",
                        "gridProperties": { "rowCount": 2000, "columnCount": 30 }
                    }
                }
            }]
        }),
    ));
    let state = app_state(backend.clone());

    let text = tools::add_sheet(state, params(json!({ "spreadsheetId": "X", "title": "New" }))).await?;

    assert_eq!(
        text,
        "Sheet added successfully.\nSpreadsheet ID: X\nNew Sheet Title: New (1)\nNew Sheet ID: 7\nDimensions: 2000 rows x 30 columns"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": "New",
                        "gridProperties": { "rowCount": 1000, "columnCount": 26 }
                    }
                }
            }]
        })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn copy_sheet_reports_the_new_sheet() -> Result<()> {
    let backend = Arc::new(
        RecordingBackend::new()
            .respond("copy_sheet_to", json!({ "sheetId": 311, "title": "Copy of Data", "index": 2 })),
    );
    let state = app_state(backend.clone());

    let text = tools::copy_sheet(
        state,
        params(json!({ "spreadsheetId": "src", "sheetId": 9, "destinationSpreadsheetId": "dst" })),
    )
    .await?;

    assert_eq!(
        text,
        "Sheet copied successfully.\nSource Spreadsheet ID: src\nSource Sheet ID: 9\nDestination Spreadsheet ID: dst\nNew Sheet ID: 311\nNew Sheet Index: 2"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "sheetId": 9, "destinationSpreadsheetId": "dst" })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn update_sheet_properties_sends_only_supplied_fields() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend.clone());

    let text = tools::update_sheet_properties(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "sheetId": 3,
            "title": "Renamed",
            "gridProperties": { "frozenRowCount": 1 }
        })),
    )
    .await?;

    assert_eq!(
        text,
        "Sheet properties updated successfully.\nSpreadsheet ID: abc\nSheet ID: 3\nUpdated properties: title, gridProperties"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "requests": [{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": 3,
                        "title": "Renamed",
                        "gridProperties": { "frozenRowCount": 1 }
                    },
                    "fields": "title,gridProperties"
                }
            }]
        })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn delete_sheet_echoes_the_sheet_id() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend.clone());

    let text =
        tools::delete_sheet(state, params(json!({ "spreadsheetId": "abc", "sheetId": 0 }))).await?;

    assert_eq!(
        text,
        "Sheet deleted successfully.\nSpreadsheet ID: abc\nDeleted Sheet ID: 0"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "requests": [{ "deleteSheet": { "sheetId": 0 } }] })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn get_values_renders_a_tab_separated_grid() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "get_values",
        json!({
            "range": "Sheet1!A1:C2",
            "majorDimension": "ROWS",
            "values": [["Name", "Qty", "Paid"], ["Widget", 3, true], ["Gadget", null, false]]
        }),
    ));
    let state = app_state(backend.clone());

    let text =
        tools::get_values(state, params(json!({ "spreadsheetId": "abc", "range": "Sheet1!A1:C2" })))
            .await?;

    assert_eq!(
        text,
        "Retrieved values from Sheet1!A1:C2:\nData (3 rows):\nName\tQty\tPaid\nWidget\t3\ttrue\nGadget\t\tfalse"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "range": "Sheet1!A1:C2",
            "majorDimension": "ROWS",
            "valueRenderOption": "FORMATTED_VALUE"
        })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn get_values_without_data_says_so() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond("get_values", json!({ "range": "Z1:Z9" })));
    let state = app_state(backend);

    let text = tools::get_values(
        state,
        params(json!({ "spreadsheetId": "abc", "range": "Z1:Z9", "majorDimension": "COLUMNS" })),
    )
    .await?;

    assert_eq!(
        text,
        "Retrieved values from Z1:Z9:\nNo data found in the specified range."
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn update_and_append_report_reply_counts() -> Result<()> {
    let backend = Arc::new(
        RecordingBackend::new()
            .respond(
                "update_values",
                json!({ "updatedRange": "Sheet1!A1:B2", "updatedRows": 2, "updatedColumns": 2, "updatedCells": 4 }),
            )
            .respond(
                "append_values",
                json!({
                    "tableRange": "Log!A1:B3",
                    "updates": { "updatedRange": "Log!A4:B4", "updatedRows": 1, "updatedColumns": 2, "updatedCells": 2 }
                }),
            ),
    );
    let state = app_state(backend.clone());

    let updated = tools::update_values(
        state.clone(),
        params(json!({
            "spreadsheetId": "abc",
            "range": "Sheet1!A1:B2",
            "values": [[1, 2], [3, "=SUM(A1:B1)"]]
        })),
    )
    .await?;
    assert_eq!(
        updated,
        "Values updated successfully.\nSpreadsheet ID: abc\nRange: Sheet1!A1:B2\nUpdated cells: 4\nUpdated rows: 2\nUpdated columns: 2"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "range": "Sheet1!A1:B2",
            "valueInputOption": "USER_ENTERED",
            "body": {
                "range": "Sheet1!A1:B2",
                "majorDimension": "ROWS",
                "values": [[1, 2], [3, "=SUM(A1:B1)"]]
            }
        })
    );

    let appended = tools::append_values(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "range": "Log!A1",
            "values": [["x", "y"]],
            "valueInputOption": "RAW",
            "insertDataOption": "OVERWRITE"
        })),
    )
    .await?;
    assert_eq!(
        appended,
        "Values appended successfully.\nSpreadsheet ID: abc\nRange: Log!A4:B4\nUpdated cells: 2\nUpdated rows: 1\nUpdated columns: 2"
    );
    let call = backend.last_call();
    assert_eq!(call.payload["valueInputOption"], "RAW");
    assert_eq!(call.payload["insertDataOption"], "OVERWRITE");
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn missing_reply_counts_render_as_unknown() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend);

    let text = tools::clear_values(state.clone(), params(json!({ "spreadsheetId": "abc", "range": "A1:B2" })))
        .await?;
    assert_eq!(
        text,
        "Values cleared successfully.\nSpreadsheet ID: abc\nRange: unknown"
    );

    let text = tools::update_values(
        state,
        params(json!({ "spreadsheetId": "abc", "range": "A1", "values": [[1]] })),
    )
    .await?;
    assert!(text.ends_with("Updated cells: unknown\nUpdated rows: unknown\nUpdated columns: unknown"));
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn batch_get_values_renders_each_range() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "batch_get_values",
        json!({
            "spreadsheetId": "abc",
            "valueRanges": [
                { "range": "Sheet1!A1:B1", "values": [["a", "b"]] },
                { "range": "Sheet2!A1:A3" }
            ]
        }),
    ));
    let state = app_state(backend.clone());

    let text = tools::batch_get_values(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "ranges": ["Sheet1!A1:B1", "Sheet2!A1:A3"],
            "valueRenderOption": "FORMULA"
        })),
    )
    .await?;

    assert_eq!(
        text,
        "Retrieved values from 2 ranges:\n\nRange 1 (Sheet1!A1:B1):\na\tb\n\nRange 2 (Sheet2!A1:A3):\nNo data found in this range."
    );
    let call = backend.last_call();
    assert_eq!(call.payload["ranges"], json!(["Sheet1!A1:B1", "Sheet2!A1:A3"]));
    assert_eq!(call.payload["valueRenderOption"], "FORMULA");
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn batch_update_values_counts_responses() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "batch_update_values",
        json!({
            "totalUpdatedRows": 3,
            "totalUpdatedColumns": 2,
            "totalUpdatedCells": 5,
            "totalUpdatedSheets": 1,
            "responses": [{ "updatedRange": "A1:B2" }, { "updatedRange": "D1" }]
        }),
    ));
    let state = app_state(backend.clone());

    let text = tools::batch_update_values(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "data": [
                { "range": "A1:B2", "values": [[1, 2], [3, 4]] },
                { "range": "D1", "values": [["x"]], "majorDimension": "COLUMNS" }
            ]
        })),
    )
    .await?;

    assert_eq!(
        text,
        "Batch update completed successfully.\nSpreadsheet ID: abc\nTotal updated cells: 5\nTotal updated ranges: 2\nTotal updated rows: 3\nTotal updated columns: 2"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "valueInputOption": "USER_ENTERED",
            "data": [
                { "range": "A1:B2", "values": [[1, 2], [3, 4]] },
                { "range": "D1", "majorDimension": "COLUMNS", "values": [["x"]] }
            ]
        })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn developer_metadata_listing() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "search_developer_metadata",
        json!({
            "matchedDeveloperMetadata": [
                {
                    "developerMetadata": {
                        "metadataId": 11,
                        "metadataKey": "owner",
                        "metadataValue": "finance",
                        "visibility": "DOCUMENT",
                        "location": { "locationType": "SPREADSHEET", "spreadsheet": true }
                    }
                },
                {
                    "developerMetadata": {
                        "metadataId": 12,
                        "metadataKey": "col",
                        "metadataValue": "amount",
                        "visibility": "PROJECT",
                        "location": {
                            "locationType": "COLUMN",
                            "dimensionRange": { "sheetId": 0, "dimension": "COLUMNS", "startIndex": 2, "endIndex": 3 }
                        }
                    }
                }
            ]
        }),
    ));
    let state = app_state(backend.clone());

    let text = tools::get_developer_metadata(state, params(json!({ "spreadsheetId": "abc" }))).await?;

    assert_eq!(
        text,
        "Found 2 developer metadata items:\n\n\
Metadata 1:\n- ID: 11\n- Key: owner\n- Value: finance\n- Visibility: DOCUMENT\n- Location: Spreadsheet level\n\n\
Metadata 2:\n- ID: 12\n- Key: col\n- Value: amount\n- Visibility: PROJECT\n- Location: Dimension Range (Sheet ID: 0, Dimension: COLUMNS, Start: 2, End: 3)"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "dataFilters": [{}] })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn empty_developer_metadata_listing() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend);

    let text = tools::get_developer_metadata(state, params(json!({ "spreadsheetId": "abc" }))).await?;
    assert_eq!(text, "No developer metadata found in this spreadsheet.");
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn create_developer_metadata_on_a_row() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new().respond(
        "batch_update",
        json!({ "replies": [{ "createDeveloperMetadata": { "developerMetadata": { "metadataId": 901 } } }] }),
    ));
    let state = app_state(backend.clone());

    let text = tools::create_developer_metadata(
        state,
        params(json!({
            "spreadsheetId": "abc",
            "metadataKey": "status",
            "metadataValue": "reviewed",
            "location": { "type": "ROW", "sheetId": 0, "rowIndex": 4 }
        })),
    )
    .await?;

    assert_eq!(
        text,
        "Developer metadata created successfully.\nSpreadsheet ID: abc\nMetadata ID: 901\nKey: status\nValue: reviewed\nLocation Type: ROW"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "requests": [{
                "createDeveloperMetadata": {
                    "developerMetadata": {
                        "metadataKey": "status",
                        "metadataValue": "reviewed",
                        "location": {
                            "dimensionRange": { "sheetId": 0, "dimension": "ROWS", "startIndex": 4, "endIndex": 5 }
                        },
                        "visibility": "DOCUMENT"
                    }
                }
            }]
        })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn negative_location_index_never_reaches_the_backend() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend.clone());

    let outcome = invoke(
        "createDeveloperMetadata",
        tools::create_developer_metadata(
            state,
            params(json!({
                "spreadsheetId": "abc",
                "metadataKey": "k",
                "metadataValue": "v",
                "location": { "type": "CELL", "sheetId": 0, "rowIndex": 1, "columnIndex": -1 }
            })),
        ),
    )
    .await;

    let invalid = outcome.expect_err("negative index is a parameter error");
    assert_eq!(invalid.field(), Some("location.columnIndex"));
    assert!(backend.calls().is_empty());
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn update_and_delete_developer_metadata_payloads() -> Result<()> {
    let backend = Arc::new(RecordingBackend::new());
    let state = app_state(backend.clone());

    let updated = tools::update_developer_metadata(
        state.clone(),
        params(json!({ "spreadsheetId": "abc", "metadataId": 12, "metadataValue": "v2", "visibility": "PROJECT" })),
    )
    .await?;
    assert_eq!(
        updated,
        "Developer metadata updated successfully.\nSpreadsheet ID: abc\nMetadata ID: 12\nUpdated fields: metadataValue, visibility"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({
            "requests": [{
                "updateDeveloperMetadata": {
                    "developerMetadata": { "metadataId": 12, "metadataValue": "v2", "visibility": "PROJECT" },
                    "fields": "metadataValue,visibility"
                }
            }]
        })
    );

    let deleted = tools::delete_developer_metadata(
        state,
        params(json!({ "spreadsheetId": "abc", "metadataId": 12 })),
    )
    .await?;
    assert_eq!(
        deleted,
        "Developer metadata deleted successfully.\nSpreadsheet ID: abc\nMetadata ID: 12"
    );
    assert_eq!(
        backend.last_call().payload,
        json!({ "requests": [{ "deleteDeveloperMetadata": { "developerId": 12 } }] })
    );
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn remote_failures_become_error_envelopes() -> Result<()> {
    let backend = Arc::new(
        RecordingBackend::new()
            .fail("get_values", not_found("Requested entity was not found."))
            .fail(
                "batch_update",
                ApiError::new(403, "Forbidden", json!("insufficient permissions")),
            ),
    );
    let state = app_state(backend);

    let envelope = invoke(
        "getValues",
        tools::get_values(state.clone(), params(json!({ "spreadsheetId": "gone", "range": "A1" }))),
    )
    .await?;
    assert!(envelope.is_error);
    assert_eq!(
        envelope.text(),
        "API Error (404 Not Found): Requested entity was not found."
    );

    let envelope = invoke(
        "deleteSheet",
        tools::delete_sheet(state, params(json!({ "spreadsheetId": "abc", "sheetId": 1 }))),
    )
    .await?;
    assert!(envelope.is_error);
    assert_eq!(
        envelope.text(),
        r#"API Error (403 Forbidden): "insufficient permissions""#
    );
    Ok(())
}
