//! 在庫表への書き込み

use crate::config::ColumnNames;
use crate::parser::LocationPair;
use crate::reconcile::UpdateTriple;
use crate::sheets::{SheetStore, SheetTable};
use anyhow::{Context, Result};
use serde::Serialize;

/// 自動更新したセルに付けるメモ
pub const AI_NOTE: &str = "Made by AI";

/// 書き込み結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// 更新した商品コード
    pub updated: Vec<String>,
    /// シートに見つからず飛ばした商品コード
    pub skipped: Vec<String>,
}

fn require_column(table: &SheetTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .with_context(|| format!("列が見つかりません: {}", name))
}

/// 突き合わせ結果を書き込む（Location と Qty、Location にはメモ）
///
/// シートにない商品コードは警告を出して飛ばす。メモの失敗は無視する。
pub async fn apply_updates(
    store: &dyn SheetStore,
    columns: &ColumnNames,
    updates: &[UpdateTriple],
) -> Result<UpdateOutcome> {
    let table = store.read_all_rows().await?;
    require_column(&table, &columns.product)?;
    let loc_col = require_column(&table, &columns.location)?;
    let qty_col = require_column(&table, &columns.qty)?;

    let mut outcome = UpdateOutcome::default();

    for update in updates {
        let Some(row) = table.row_index(&columns.product, &update.product) else {
            tracing::warn!("SKIP: {} not found in sheet", update.product);
            outcome.skipped.push(update.product.clone());
            continue;
        };

        store.write_cell(row, loc_col, &update.location).await?;
        store.write_cell(row, qty_col, &update.qty).await?;

        if let Err(e) = store.annotate_cell(row, loc_col, AI_NOTE).await {
            tracing::debug!("メモの追加に失敗 ({}): {:#}", update.product, e);
        }

        tracing::info!(
            "{}: {} -> {} (qty {})",
            update.product,
            table.cell(row, loc_col),
            update.location,
            update.qty
        );
        outcome.updated.push(update.product.clone());
    }

    Ok(outcome)
}

/// 商品コード / 位置ペアを書き込む（Location のみ）
pub async fn apply_location_pairs(
    store: &dyn SheetStore,
    columns: &ColumnNames,
    pairs: &[LocationPair],
) -> Result<UpdateOutcome> {
    let table = store.read_all_rows().await?;
    require_column(&table, &columns.product)?;
    let loc_col = require_column(&table, &columns.location)?;

    let mut outcome = UpdateOutcome::default();

    for pair in pairs {
        let Some(row) = table.row_index(&columns.product, &pair.product) else {
            tracing::warn!("Code not found: {}", pair.product);
            outcome.skipped.push(pair.product.clone());
            continue;
        };

        store.write_cell(row, loc_col, &pair.location).await?;
        tracing::info!("{}: -> {}", pair.product, pair.location);
        outcome.updated.push(pair.product.clone());
    }

    Ok(outcome)
}
