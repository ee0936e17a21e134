//! Ratcliff/Obershelp 類似度

/// 2つの文字列の類似度 `2 * M / T` を返す（0.0〜1.0）
///
/// M は最長共通部分文字列を左右に再帰的に探して得た一致文字数、
/// T は両文字列の文字数の合計。両方とも空なら 1.0。
/// 引数は辞書順に並べ替えてから比較するので `ratio(a, b) == ratio(b, a)`。
pub fn ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// 一致ブロックの文字数の合計
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// `a[alo..ahi]` と `b[blo..bhi]` の最長共通部分文字列 `(i, j, k)`
///
/// 同じ長さが複数あれば a で最も早く始まるもの、その中で b で最も早いもの。
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run[n] = b[blo + n - 1] で終わる一致の長さ
    let mut prev = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        let mut run = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = prev[j - blo] + 1;
            run[j - blo + 1] = k;
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        prev = run;
    }

    (best_i, best_j, best_k)
}
