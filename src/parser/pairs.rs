//! 商品コード / 位置ペアの単純抽出

use super::LocationPair;
use regex::Regex;
use std::sync::LazyLock;

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z0-9]+)\s+([A-Z0-9-]+)").unwrap());

/// テキスト全体から「商品コード 位置」の組を抽出
///
/// マッチは重ならず、空白には改行も含まれる。
pub fn extract_pairs(text: &str) -> Vec<LocationPair> {
    PAIR_RE
        .captures_iter(text)
        .map(|caps| LocationPair {
            product: caps[1].trim().to_string(),
            location: caps[2].trim().to_string(),
        })
        .collect()
}
