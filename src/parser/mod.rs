//! テキスト解析モジュール - 在庫シートのOCRテキストから行を抽出

mod pairs;
mod sections;

use serde::Serialize;

pub use pairs::extract_pairs;
pub use sections::{sectionize, tokenize};

/// DE セクションの行（現在のパレット位置）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeRow {
    pub product: String,
    pub location: String,
}

/// A セクションの行（入荷: 位置・商品・数量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalRow {
    pub location: String,
    pub product: String,
    pub qty: String,
}

/// 商品コードと位置の組（単純抽出モード）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationPair {
    pub product: String,
    pub location: String,
}

/// 1枚のスキャンから得られた2つの表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTables {
    /// DE セクション（入力順）
    pub de_rows: Vec<DeRow>,
    /// A セクション（入力順）
    pub a_rows: Vec<ArrivalRow>,
}

impl ParsedTables {
    /// OCRテキスト全体を解析
    pub fn parse(text: &str) -> Self {
        sectionize(split_lines(text))
    }

    pub fn is_empty(&self) -> bool {
        self.de_rows.is_empty() && self.a_rows.is_empty()
    }
}

/// 改行で分割（\n, \r\n, \r および Unicode の行区切りに対応）
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_line_break)
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handles_crlf_and_bare_cr() {
        let text = "DE Produit Emplacement\r\nABC123 A1-02\rA Produit Qte\r\nA1-02 ABC123 50";
        let tables = ParsedTables::parse(text);
        assert_eq!(tables.de_rows.len(), 1);
        assert_eq!(tables.a_rows.len(), 1);
        assert_eq!(tables.a_rows[0].qty, "50");
    }

    #[test]
    fn empty_text_gives_empty_tables() {
        assert!(ParsedTables::parse("").is_empty());
    }
}
