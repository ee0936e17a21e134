//! DE / A セクション分割

use super::{ArrivalRow, DeRow, ParsedTables};
use regex::Regex;
use std::sync::LazyLock;

/// 商品コード・位置・数量のトークン
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z0-9-]+").unwrap());

/// DE セクションの最小トークン数
const DE_MIN_TOKENS: usize = 2;
/// A セクションの最小トークン数
const A_MIN_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    De,
    Arrival,
}

/// 行からトークンを抽出
pub fn tokenize(line: &str) -> Vec<&str> {
    TOKEN_RE.find_iter(line).map(|m| m.as_str()).collect()
}

/// 行の列を DE / A の2つの表に分割
///
/// ヘッダー行（`DE` と `Produit` を含む行、`A` で始まり `Produit` を含む行）で
/// セクションが切り替わり、ヘッダー行自体は捨てられる。
/// 最初のヘッダーより前の行と、トークン数が足りない行は黙って読み飛ばす。
pub fn sectionize<'a, I>(lines: I) -> ParsedTables
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tables = ParsedTables::default();
    let mut section = Section::None;

    for line in lines {
        let line = line.trim();

        if line.contains("DE") && line.contains("Produit") {
            section = Section::De;
            continue;
        }
        if line.starts_with('A') && line.contains("Produit") {
            section = Section::Arrival;
            continue;
        }

        let tokens = tokenize(line);
        match section {
            Section::De if tokens.len() >= DE_MIN_TOKENS => {
                tables.de_rows.push(DeRow {
                    product: tokens[0].to_string(),
                    location: tokens[1].to_string(),
                });
            }
            Section::Arrival if tokens.len() >= A_MIN_TOKENS => {
                tables.a_rows.push(ArrivalRow {
                    location: tokens[0].to_string(),
                    product: tokens[1].to_string(),
                    qty: tokens[2].to_string(),
                });
            }
            _ => {}
        }
    }

    tables
}
