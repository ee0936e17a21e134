//! Google Cloud Vision API によるOCR

mod client;

use crate::scan::Scan;
use anyhow::Result;
use async_trait::async_trait;

pub use client::VisionClient;

/// スキャンからテキストを抽出するもの
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// 全文テキストを返す（テキストがなければ空文字列）
    async fn detect_text(&self, scan: &Scan) -> Result<String>;
}

#[async_trait]
impl TextDetector for VisionClient {
    async fn detect_text(&self, scan: &Scan) -> Result<String> {
        VisionClient::detect_text(self, scan).await
    }
}
