use anyhow::Result;
use httpmock::prelude::*;
use pallet_tracker::auth::TokenSource;
use pallet_tracker::config::SheetTarget;
use pallet_tracker::sheets::{SheetStore, SheetsClient};
use serde_json::json;
use std::sync::Arc;

fn client(server: &MockServer) -> SheetsClient {
    client_for_sheet(server, "Inventory")
}

fn client_for_sheet(server: &MockServer, sheet_name: &str) -> SheetsClient {
    SheetsClient::with_base_url(
        Arc::new(TokenSource::fixed("test-token")),
        SheetTarget {
            spreadsheet_id: "sheet123".to_string(),
            sheet_name: sheet_name.to_string(),
        },
        server.base_url(),
    )
}

/// ヘッダー行とレコードを読み込む
#[tokio::test]
async fn test_read_all_rows() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet123/values/'Inventory'")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({
                "range": "Inventory!A1:C3",
                "majorDimension": "ROWS",
                "values": [
                    ["ProductCode", "Location", "Qty"],
                    ["ABC123", "A1-01", "10"],
                    ["XYZ999", "C3-02"]
                ]
            }));
        })
        .await;

    let table = client(&server).read_all_rows().await?;

    mock.assert_async().await;
    assert_eq!(table.column_index("Qty"), Some(3));
    assert_eq!(table.row_index("ProductCode", "XYZ999"), Some(3));
    assert_eq!(table.cell(3, 3), "");
    Ok(())
}

/// 空のシートはヘッダーなし
#[tokio::test]
async fn test_read_empty_sheet() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet123/values/'Inventory'");
            then.status(200)
                .json_body(json!({ "range": "Inventory!A1:Z1000", "majorDimension": "ROWS" }));
        })
        .await;

    let table = client(&server).read_all_rows().await?;
    assert!(table.headers.is_empty());
    Ok(())
}

/// 1セルずつ USER_ENTERED で書き込む
#[tokio::test]
async fn test_write_cell() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v4/spreadsheets/sheet123/values/'Inventory'!B2")
                .query_param("valueInputOption", "USER_ENTERED")
                .json_body(json!({
                    "range": "'Inventory'!B2",
                    "majorDimension": "ROWS",
                    "values": [["B7-01"]]
                }));
            then.status(200).json_body(json!({ "updatedCells": 1 }));
        })
        .await;

    client(&server).write_cell(2, 2, "B7-01").await?;

    mock.assert_async().await;
    Ok(())
}

/// メモはシートIDを引いてから batchUpdate で付ける
#[tokio::test]
async fn test_annotate_cell_resolves_sheet_id_once() -> Result<()> {
    let server = MockServer::start_async().await;

    let metadata = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sheet123")
                .query_param("fields", "sheets.properties");
            then.status(200).json_body(json!({
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Archive" } },
                    { "properties": { "sheetId": 42, "title": "Inventory" } }
                ]
            }));
        })
        .await;

    let batch = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sheet123:batchUpdate")
                .body_contains("\"sheetId\":42")
                .body_contains("Made by AI");
            then.status(200).json_body(json!({ "replies": [{}] }));
        })
        .await;

    let client = client(&server);
    client.annotate_cell(3, 2, "Made by AI").await?;
    client.annotate_cell(4, 2, "Made by AI").await?;

    metadata.assert_hits_async(1).await;
    batch.assert_hits_async(2).await;
    Ok(())
}

/// 存在しないワークシートはエラー
#[tokio::test]
async fn test_unknown_worksheet() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet123");
            then.status(200).json_body(json!({
                "sheets": [{ "properties": { "sheetId": 0, "title": "Archive" } }]
            }));
        })
        .await;

    let err = client(&server).annotate_cell(2, 2, "note").await.unwrap_err();
    assert!(err.to_string().contains("Inventory"));
    Ok(())
}

/// 書き込みエラーは呼び出し元に返る
#[tokio::test]
async fn test_write_error_propagates() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(PUT).path_contains("/values/");
            then.status(400).body("Unable to parse range");
        })
        .await;

    let err = client(&server).write_cell(2, 2, "X").await.unwrap_err();
    assert!(format!("{:#}", err).contains("Unable to parse range"));
    Ok(())
}

/// セル参照に見えるシート名も引用符付きで送る
#[tokio::test]
async fn test_cell_like_sheet_name_is_quoted() -> Result<()> {
    let server = MockServer::start_async().await;

    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sheet123/values/'Q1'");
            then.status(200).json_body(json!({
                "range": "'Q1'!A1:C2",
                "majorDimension": "ROWS",
                "values": [["ProductCode", "Location", "Qty"], ["ABC123", "A1-01", "10"]]
            }));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v4/spreadsheets/sheet123/values/'Q1'!B2")
                .json_body(json!({
                    "range": "'Q1'!B2",
                    "majorDimension": "ROWS",
                    "values": [["E5-05"]]
                }));
            then.status(200).json_body(json!({ "updatedCells": 1 }));
        })
        .await;

    let sheet = client_for_sheet(&server, "Q1");
    let table = sheet.read_all_rows().await?;
    assert_eq!(table.column_index("Location"), Some(2));
    sheet.write_cell(2, 2, "E5-05").await?;

    read.assert_async().await;
    write.assert_async().await;
    Ok(())
}
