use anyhow::Result;
use httpmock::prelude::*;
use pallet_tracker::auth::TokenSource;
use pallet_tracker::scan::Scan;
use pallet_tracker::vision::{TextDetector, VisionClient};
use serde_json::json;
use std::sync::Arc;

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

fn client(server: &MockServer) -> VisionClient {
    VisionClient::with_base_url(Arc::new(TokenSource::fixed("test-token")), server.base_url())
}

/// 画像は images:annotate に送られる
#[tokio::test]
async fn test_image_goes_to_images_annotate() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images:annotate")
                .header("authorization", "Bearer test-token")
                .body_contains("DOCUMENT_TEXT_DETECTION");
            then.status(200).json_body(json!({
                "responses": [{
                    "fullTextAnnotation": { "text": "DE Produit\nABC123 A1-02\n" }
                }]
            }));
        })
        .await;

    let scan = Scan::from_bytes("sheet.png", PNG_HEADER.to_vec())?;
    let text = client(&server).detect_text(&scan).await?;

    mock.assert_async().await;
    assert_eq!(text, "DE Produit\nABC123 A1-02\n");
    Ok(())
}

/// PDF は files:annotate に送られ、ページのテキストが連結される
#[tokio::test]
async fn test_pdf_pages_are_joined() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/files:annotate")
                .body_contains("application/pdf");
            then.status(200).json_body(json!({
                "responses": [{
                    "responses": [
                        { "fullTextAnnotation": { "text": "DE Produit\nABC123 A1-02" } },
                        {},
                        { "fullTextAnnotation": { "text": "A Produit\nA1-02 ABC123 50" } }
                    ]
                }]
            }));
        })
        .await;

    let scan = Scan::from_bytes("Xerox Scan.pdf", b"%PDF-1.4 test".to_vec())?;
    let ocr: &dyn TextDetector = &client(&server);
    let text = ocr.detect_text(&scan).await?;

    mock.assert_async().await;
    assert_eq!(text, "DE Produit\nABC123 A1-02\nA Produit\nA1-02 ABC123 50");
    Ok(())
}

/// HTTPエラーはそのまま呼び出し元に返る
#[tokio::test]
async fn test_http_error_propagates() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images:annotate");
            then.status(403).body("PERMISSION_DENIED");
        })
        .await;

    let scan = Scan::from_bytes("sheet.png", PNG_HEADER.to_vec())?;
    let err = client(&server).detect_text(&scan).await.unwrap_err();
    assert!(err.to_string().contains("PERMISSION_DENIED"));
    Ok(())
}

/// レスポンス内の error はエラーになる
#[tokio::test]
async fn test_response_error_object() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images:annotate");
            then.status(200).json_body(json!({
                "responses": [{ "error": { "code": 3, "message": "Bad image data." } }]
            }));
        })
        .await;

    let scan = Scan::from_bytes("sheet.png", PNG_HEADER.to_vec())?;
    let err = client(&server).detect_text(&scan).await.unwrap_err();
    assert!(err.to_string().contains("Bad image data."));
    Ok(())
}

/// テキストがない画像は空文字列
#[tokio::test]
async fn test_blank_page_gives_empty_text() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images:annotate");
            then.status(200).json_body(json!({ "responses": [{}] }));
        })
        .await;

    let scan = Scan::from_bytes("blank.png", PNG_HEADER.to_vec())?;
    assert_eq!(client(&server).detect_text(&scan).await?, "");
    Ok(())
}
