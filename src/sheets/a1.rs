//! A1 表記

/// 列番号（1始まり）を列文字に変換（1 -> A, 27 -> AA）
pub fn column_letters(col: usize) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 行・列番号を A1 表記に変換
pub fn rowcol_to_a1(row: usize, col: usize) -> String {
    format!("{}{}", column_letters(col), row)
}

/// シート名を範囲用に引用符で囲む（`'` は `''` にする）
///
/// 囲まないと `Q1` のような名前がセル参照として読まれる。
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// シート名付きの範囲（`'Inventory'!B2`）
pub fn absolute_range(sheet_name: &str, range: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet_name), range)
}
