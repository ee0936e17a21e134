//! Sheets API クライアント

use super::{absolute_range, quote_sheet_name, rowcol_to_a1, SheetStore, SheetTable};
use crate::auth::TokenSource;
use crate::config::SheetTarget;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::OnceCell;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// 1つのワークシートを読み書きするクライアント
pub struct SheetsClient {
    tokens: Arc<TokenSource>,
    http_client: reqwest::Client,
    base_url: String,
    target: SheetTarget,
    /// batchUpdate に必要な数値のシートID
    sheet_id: OnceCell<i64>,
}

impl SheetsClient {
    /// 新しいクライアントを作成
    pub fn new(tokens: Arc<TokenSource>, target: SheetTarget) -> Self {
        Self::with_base_url(tokens, target, SHEETS_API_BASE)
    }

    /// エンドポイントを指定して作成
    pub fn with_base_url(
        tokens: Arc<TokenSource>,
        target: SheetTarget,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            target,
            sheet_id: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &SheetTarget {
        &self.target
    }

    /// `v4/spreadsheets/{id}/...` の URL を組み立てる
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Sheets API の URL が不正: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Sheets API の URL が不正: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Sheets API エラー ({}): {} {}", what, status, error_text);
        }
        Ok(response)
    }

    /// シート名から数値のシートIDを引く
    async fn resolve_sheet_id(&self) -> Result<i64> {
        let sheet_id = self
            .sheet_id
            .get_or_try_init(|| async {
                let token = self.tokens.token().await?;
                let url = self.url(&[self.target.spreadsheet_id.as_str()])?;
                let response = self
                    .http_client
                    .get(url)
                    .bearer_auth(&token)
                    .query(&[("fields", "sheets.properties")])
                    .send()
                    .await
                    .context("スプレッドシート情報の取得に失敗")?;
                let metadata: SpreadsheetMetadata = Self::check(response, "metadata")
                    .await?
                    .json()
                    .await
                    .context("スプレッドシート情報のパースに失敗")?;

                metadata
                    .sheets
                    .into_iter()
                    .map(|s| s.properties)
                    .find(|p| p.title == self.target.sheet_name)
                    .map(|p| p.sheet_id)
                    .with_context(|| format!("ワークシートが見つかりません: {}", self.target.sheet_name))
            })
            .await?;
        Ok(*sheet_id)
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_all_rows(&self) -> Result<SheetTable> {
        let token = self.tokens.token().await?;
        let range = quote_sheet_name(&self.target.sheet_name);
        let url = self.url(&[self.target.spreadsheet_id.as_str(), "values", range.as_str()])?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .context("シートの読み込みに失敗")?;

        let range: ValueRange = Self::check(response, "values.get")
            .await?
            .json()
            .await
            .context("シートのレスポンスのパースに失敗")?;

        let table = SheetTable::from_values(range.values);
        tracing::info!(
            "シート {} を読み込み: {} 行",
            self.target.sheet_name,
            table.records.len()
        );
        Ok(table)
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let token = self.tokens.token().await?;
        let range = absolute_range(&self.target.sheet_name, &rowcol_to_a1(row, col));
        let url = self.url(&[self.target.spreadsheet_id.as_str(), "values", range.as_str()])?;

        let body = ValueRangeUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: [[value]],
        };

        let response = self
            .http_client
            .put(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("セルの書き込みに失敗: {}", range))?;
        Self::check(response, "values.update").await?;

        tracing::debug!("{} = {}", range, value);
        Ok(())
    }

    async fn annotate_cell(&self, row: usize, col: usize, note: &str) -> Result<()> {
        let sheet_id = self.resolve_sheet_id().await?;
        let token = self.tokens.token().await?;
        let batch = format!("{}:batchUpdate", self.target.spreadsheet_id);
        let url = self.url(&[batch.as_str()])?;

        let body = json!({
            "requests": [{
                "updateCells": {
                    "range": {
                        "sheetId": sheet_id,
                        "startRowIndex": row - 1,
                        "endRowIndex": row,
                        "startColumnIndex": col - 1,
                        "endColumnIndex": col,
                    },
                    "rows": [{ "values": [{ "note": note }] }],
                    "fields": "note",
                }
            }]
        });

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .context("メモの追加に失敗")?;
        Self::check(response, "batchUpdate").await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    major_dimension: &'a str,
    values: [[&'a str; 1]; 1],
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}
