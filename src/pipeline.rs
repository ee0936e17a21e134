//! 1枚のスキャンを処理する流れ
//!
//! OCR → 解析 → 突き合わせ → シートへ書き込み。すべて順番に待つ。

use crate::config::{AppConfig, ColumnNames};
use crate::credentials::CredentialProvider;
use crate::inventory::{apply_location_pairs, apply_updates, UpdateOutcome};
use crate::parser::{extract_pairs, LocationPair, ParsedTables};
use crate::reconcile::UpdateTriple;
use crate::scan::Scan;
use crate::sheets::SheetStore;
use crate::vision::TextDetector;
use anyhow::Result;
use serde::Serialize;

/// 処理結果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T> {
    pub scan: String,
    /// 書き込み対象（ドライランでも埋まる）
    pub entries: Vec<T>,
    /// 書き込んだ場合の結果（ドライランまたは対象なしなら `None`）
    pub outcome: Option<UpdateOutcome>,
}

/// スキャンのテキストを取得
pub async fn scan_text(ocr: &dyn TextDetector, scan: &Scan) -> Result<String> {
    let text = ocr.detect_text(scan).await?;
    tracing::debug!("OCRテキスト {} 文字", text.chars().count());
    if text.trim().is_empty() {
        tracing::warn!("テキストを抽出できませんでした: {}", scan.name);
    }
    Ok(text)
}

/// DE / A 表を突き合わせて書き込む
///
/// `sheet` が `None` ならドライラン（書き込みなし）。
pub async fn reconcile_with(
    ocr: &dyn TextDetector,
    sheet: Option<&dyn SheetStore>,
    columns: &ColumnNames,
    scan: &Scan,
) -> Result<RunReport<UpdateTriple>> {
    let text = scan_text(ocr, scan).await?;
    let tables = ParsedTables::parse(&text);
    tracing::info!(
        "DE {} 行 / A {} 行",
        tables.de_rows.len(),
        tables.a_rows.len()
    );

    let updates = tables.updates();
    let outcome = match sheet {
        Some(store) if !updates.is_empty() => Some(apply_updates(store, columns, &updates).await?),
        _ => None,
    };

    Ok(RunReport {
        scan: scan.name.clone(),
        entries: updates,
        outcome,
    })
}

/// 商品コード / 位置ペアを書き込む
pub async fn locate_with(
    ocr: &dyn TextDetector,
    sheet: Option<&dyn SheetStore>,
    columns: &ColumnNames,
    scan: &Scan,
) -> Result<RunReport<LocationPair>> {
    let text = scan_text(ocr, scan).await?;
    let pairs = extract_pairs(&text);
    tracing::info!("{} 組を抽出", pairs.len());

    let outcome = match sheet {
        Some(store) if !pairs.is_empty() => Some(apply_location_pairs(store, columns, &pairs).await?),
        _ => None,
    };

    Ok(RunReport {
        scan: scan.name.clone(),
        entries: pairs,
        outcome,
    })
}

/// 設定とプロバイダからクライアントを作って突き合わせを実行
pub async fn reconcile_scan(
    provider: &dyn CredentialProvider,
    config: &AppConfig,
    scan: &Scan,
    dry_run: bool,
) -> Result<RunReport<UpdateTriple>> {
    let ocr = provider.ocr_client()?;
    let sheet = if dry_run {
        None
    } else {
        Some(provider.sheet_client(&config.sheet)?)
    };
    reconcile_with(
        &ocr,
        sheet.as_ref().map(|s| s as &dyn SheetStore),
        &config.columns,
        scan,
    )
    .await
}

/// 設定とプロバイダからクライアントを作ってペア書き込みを実行
pub async fn locate_scan(
    provider: &dyn CredentialProvider,
    config: &AppConfig,
    scan: &Scan,
    dry_run: bool,
) -> Result<RunReport<LocationPair>> {
    let ocr = provider.ocr_client()?;
    let sheet = if dry_run {
        None
    } else {
        Some(provider.sheet_client(&config.sheet)?)
    };
    locate_with(
        &ocr,
        sheet.as_ref().map(|s| s as &dyn SheetStore),
        &config.columns,
        scan,
    )
    .await
}
