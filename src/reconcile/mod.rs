//! 表の突き合わせ - DE 行と A 行から更新内容を作る

mod matcher;
mod similarity;

use crate::parser::{ArrivalRow, DeRow, ParsedTables};
use serde::Serialize;

pub use matcher::{approximate_match, best_match, Match, MATCH_THRESHOLD};
pub use similarity::ratio;

/// スプレッドシートに書き込む更新内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateTriple {
    pub product: String,
    pub location: String,
    pub qty: String,
}

/// DE 行ごとに近似マッチした A 行から更新内容を作る
///
/// マッチしなかった DE 行は結果に含めない。
pub fn build_updates(de_rows: &[DeRow], a_rows: &[ArrivalRow]) -> Vec<UpdateTriple> {
    let mut updates = Vec::new();

    for row in de_rows {
        match approximate_match(&row.product, a_rows) {
            Some(m) => {
                tracing::debug!(
                    "{} -> {} ({}) score={:.3}",
                    row.product,
                    m.row.product,
                    m.row.location,
                    m.score
                );
                updates.push(UpdateTriple {
                    product: row.product.clone(),
                    location: m.row.location.clone(),
                    qty: m.row.qty.clone(),
                });
            }
            None => tracing::debug!("{}: 対応する入荷行なし", row.product),
        }
    }

    updates
}

impl ParsedTables {
    /// この表から更新内容を作る
    pub fn updates(&self) -> Vec<UpdateTriple> {
        build_updates(&self.de_rows, &self.a_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconciles_sample_sheet() {
        let text = "DE Produit Emplacement\nABC123 A1-02\nA Produit Qte\nA1-02 ABC123 50\n";
        let updates = ParsedTables::parse(text).updates();
        assert_eq!(
            updates,
            vec![UpdateTriple {
                product: "ABC123".into(),
                location: "A1-02".into(),
                qty: "50".into(),
            }]
        );
    }

    #[test]
    fn unmatched_rows_are_dropped() {
        let text = "DE Produit\nXYZ999 C3\nABC123 A1\nA Produit\nB7-01 ABC12X 12\n";
        let updates = ParsedTables::parse(text).updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].product, "ABC123");
        assert_eq!(updates[0].location, "B7-01");
        assert_eq!(updates[0].qty, "12");
    }

    #[test]
    fn output_never_exceeds_de_rows() {
        let de = vec![
            DeRow { product: "P1".into(), location: "X".into() },
            DeRow { product: "P2".into(), location: "Y".into() },
        ];
        let a: Vec<ArrivalRow> = (0..5)
            .map(|n| ArrivalRow {
                location: format!("L{n}"),
                product: format!("P{n}"),
                qty: n.to_string(),
            })
            .collect();
        let updates = build_updates(&de, &a);
        assert!(updates.len() <= de.len());
        assert_eq!(updates[1].location, "L2");
    }

    #[test]
    fn several_de_rows_may_share_one_arrival() {
        let de = vec![
            DeRow { product: "ABC123".into(), location: "X".into() },
            DeRow { product: "ABC124".into(), location: "Y".into() },
        ];
        let a = vec![ArrivalRow {
            location: "A1".into(),
            product: "ABC123".into(),
            qty: "5".into(),
        }];
        let updates = build_updates(&de, &a);
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.location == "A1"));
    }

    #[test]
    fn no_arrivals_means_no_updates() {
        let de = vec![DeRow { product: "ABC123".into(), location: "X".into() }];
        assert!(build_updates(&de, &[]).is_empty());
    }
}
