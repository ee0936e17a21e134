//! Vision API クライアント

use crate::auth::TokenSource;
use crate::scan::Scan;
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const VISION_API_BASE: &str = "https://vision.googleapis.com";

/// Vision APIクライアント
pub struct VisionClient {
    tokens: Arc<TokenSource>,
    http_client: reqwest::Client,
    base_url: String,
}

impl VisionClient {
    /// 新しいクライアントを作成
    pub fn new(tokens: Arc<TokenSource>) -> Self {
        Self::with_base_url(tokens, VISION_API_BASE)
    }

    /// エンドポイントを指定して作成
    pub fn with_base_url(tokens: Arc<TokenSource>, base_url: impl Into<String>) -> Self {
        Self {
            tokens,
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// スキャンからテキストを抽出
    pub async fn detect_text(&self, scan: &Scan) -> Result<String> {
        tracing::info!("OCR: {} ({:?}, {} bytes)", scan.name, scan.kind, scan.bytes.len());

        match scan.kind.file_mime_type() {
            None => self.annotate_image(&scan.bytes).await,
            Some(mime_type) => self.annotate_file(&scan.bytes, mime_type).await,
        }
    }

    /// 画像を images:annotate に送る
    async fn annotate_image(&self, image_data: &[u8]) -> Result<String> {
        let request = VisionRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    content: STANDARD.encode(image_data),
                },
                features: vec![Feature::document_text()],
                image_context: Some(ImageContext::default()),
            }],
        };

        let response: VisionResponse = self.post("v1/images:annotate", &request).await?;

        let Some(first) = response.responses.into_iter().next() else {
            return Ok(String::new());
        };
        first.into_text()
    }

    /// PDF / TIFF を files:annotate に送る（ページごとのテキストを改行で連結）
    async fn annotate_file(&self, file_data: &[u8], mime_type: &str) -> Result<String> {
        let request = FilesRequest {
            requests: vec![AnnotateFileRequest {
                input_config: InputConfig {
                    content: STANDARD.encode(file_data),
                    mime_type: mime_type.to_string(),
                },
                features: vec![Feature::document_text()],
                image_context: Some(ImageContext::default()),
            }],
        };

        let response: FilesResponse = self.post("v1/files:annotate", &request).await?;

        let mut pages = Vec::new();
        for file in response.responses {
            if let Some(error) = file.error {
                anyhow::bail!("Vision API エラー: {}", error);
            }
            for page in file.responses {
                let text = page.into_text()?;
                if !text.is_empty() {
                    pages.push(text);
                }
            }
        }

        Ok(pages.join("\n"))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let token = self.tokens.token().await?;
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .context("Vision APIリクエストに失敗")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Vision API エラー: {}", error_text);
        }

        response
            .json()
            .await
            .context("Vision APIレスポンスのパースに失敗")
    }
}

// Vision API リクエスト/レスポンス構造体

#[derive(Serialize)]
struct VisionRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Serialize)]
struct Image {
    content: String,
}

#[derive(Serialize)]
struct FilesRequest {
    requests: Vec<AnnotateFileRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateFileRequest {
    input_config: InputConfig,
    features: Vec<Feature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_context: Option<ImageContext>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InputConfig {
    content: String,
    mime_type: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
    #[serde(rename = "maxResults")]
    max_results: i32,
}

impl Feature {
    fn document_text() -> Self {
        Self {
            feature_type: "DOCUMENT_TEXT_DETECTION".to_string(),
            max_results: 1,
        }
    }
}

#[derive(Serialize)]
struct ImageContext {
    #[serde(rename = "languageHints")]
    language_hints: Vec<String>,
}

impl Default for ImageContext {
    /// 在庫シートはフランス語と英数字
    fn default() -> Self {
        Self {
            language_hints: vec!["fr".to_string(), "en".to_string()],
        }
    }
}

#[derive(Deserialize)]
struct VisionResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Deserialize)]
struct FilesResponse {
    #[serde(default)]
    responses: Vec<AnnotateFileResponse>,
}

#[derive(Deserialize)]
struct AnnotateFileResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
    error: Option<Status>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<Status>,
}

impl AnnotateImageResponse {
    fn into_text(self) -> Result<String> {
        if let Some(error) = self.error {
            anyhow::bail!("Vision API エラー: {}", error);
        }
        Ok(self.full_text_annotation.map(|a| a.text).unwrap_or_default())
    }
}

#[derive(Deserialize)]
struct TextAnnotation {
    text: String,
}

#[derive(Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}
