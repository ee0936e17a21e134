//! スキャン読み込み - 画像 / PDF の判定

use anyhow::{Context, Result};
use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;

/// ファイル選択ダイアログとドロップで受け付ける拡張子
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "pdf", "tif", "tiff",
];

/// スキャンの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// images:annotate に直接送れる画像
    Image,
    /// files:annotate に送るPDF
    Pdf,
    /// files:annotate に送るTIFF
    Tiff,
}

impl ScanKind {
    /// files:annotate 用の MIME タイプ（画像の場合は `None`）
    pub fn file_mime_type(self) -> Option<&'static str> {
        match self {
            ScanKind::Image => None,
            ScanKind::Pdf => Some("application/pdf"),
            ScanKind::Tiff => Some("image/tiff"),
        }
    }

    /// 先頭バイトから判定
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(ScanKind::Pdf);
        }
        match image::guess_format(bytes).ok()? {
            ImageFormat::Tiff => Some(ScanKind::Tiff),
            ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
            | ImageFormat::Ico => Some(ScanKind::Image),
            _ => None,
        }
    }

    /// 拡張子から判定
    fn from_extension(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(ScanKind::Pdf),
            "tif" | "tiff" => Some(ScanKind::Tiff),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => Some(ScanKind::Image),
            _ => None,
        }
    }
}

/// 読み込んだスキャン
#[derive(Debug, Clone)]
pub struct Scan {
    /// 表示用のファイル名
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub kind: ScanKind,
}

impl Scan {
    /// バイト列から作成（内容で判定し、判定できなければ拡張子で判定）
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        let name = name.into();
        let bytes = bytes.into();

        if bytes.is_empty() {
            anyhow::bail!("空のファイルです: {}", name);
        }

        let kind = ScanKind::sniff(&bytes)
            .or_else(|| ScanKind::from_extension(&name))
            .with_context(|| format!("未対応のファイル形式: {}", name))?;

        Ok(Self { name, bytes, kind })
    }

    /// ファイルから読み込む
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("スキャンファイルの読み込みに失敗: {:?}", path))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("scan")
            .to_string();
        Self::from_bytes(name, bytes)
    }

    /// 受け付ける拡張子か
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
    }
}
