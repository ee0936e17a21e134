//! 商品コードの近似マッチング

use super::similarity::ratio;
use crate::parser::ArrivalRow;

/// これを超える類似度のみマッチとみなす
pub const MATCH_THRESHOLD: f64 = 0.6;

/// マッチ結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub row: &'a ArrivalRow,
    pub score: f64,
}

/// 最も類似度が高い候補（しきい値なし）
///
/// 同点の場合は先に現れた候補を採用する。類似度 0 の候補は選ばない。
pub fn best_match<'a>(product: &str, candidates: &'a [ArrivalRow]) -> Option<Match<'a>> {
    let mut best: Option<Match<'a>> = None;

    for row in candidates {
        let score = ratio(product, &row.product);
        let current = best.map_or(0.0, |m| m.score);
        if score > current {
            best = Some(Match { row, score });
        }
    }

    best
}

/// しきい値を超える最良の候補を返す。なければ `None`
pub fn approximate_match<'a>(product: &str, candidates: &'a [ArrivalRow]) -> Option<Match<'a>> {
    best_match(product, candidates).filter(|m| m.score > MATCH_THRESHOLD)
}
