//! Google Sheets 在庫表

mod a1;
mod client;

use anyhow::Result;
use async_trait::async_trait;

pub use a1::{absolute_range, column_letters, quote_sheet_name, rowcol_to_a1};
pub use client::SheetsClient;

/// 行・列で指定できる表（行・列とも1始まり、1行目はヘッダー）
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// ヘッダー行とすべてのレコードを読む
    async fn read_all_rows(&self) -> Result<SheetTable>;

    /// セルに値を書き込む
    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<()>;

    /// セルにメモを付ける
    async fn annotate_cell(&self, row: usize, col: usize, note: &str) -> Result<()>;
}

/// ワークシートの内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    /// ヘッダーを除くレコード（シートの2行目から）
    pub records: Vec<Vec<String>>,
}

impl SheetTable {
    /// API の値配列から作成（先頭行をヘッダーとする）
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut rows = values.into_iter();
        let headers = rows
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        Self {
            headers,
            records: rows.collect(),
        }
    }

    /// 列番号（1始まり）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name).map(|i| i + 1)
    }

    /// `column` の値が `value` に一致する最初のレコードのシート行番号
    ///
    /// ヘッダーがあるので最初のレコードは2行目。
    pub fn row_index(&self, column: &str, value: &str) -> Option<usize> {
        let col = self.column_index(column)? - 1;
        self.records
            .iter()
            .position(|record| record.get(col).is_some_and(|cell| cell.trim() == value))
            .map(|i| i + 2)
    }

    /// セルの値（シート行番号と列番号、範囲外は空文字列）
    pub fn cell(&self, row: usize, col: usize) -> &str {
        row.checked_sub(2)
            .and_then(|r| self.records.get(r))
            .and_then(|record| record.get(col.checked_sub(1)?))
            .map(String::as_str)
            .unwrap_or("")
    }
}
