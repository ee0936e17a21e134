//! パレットトラッカー - スキャンした在庫シートから Google スプレッドシートの位置を更新
//!
//! # 機能
//! - Google Vision API で画像 / PDF からテキスト抽出
//! - DE（現在位置）/ A（入荷）セクションの解析と商品コードの近似マッチング
//! - 商品コード / 位置ペアの単純抽出
//! - Google Sheets の Location / Qty 列を更新
//! - コマンドラインとドラッグ＆ドロップ対応GUI

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gui;
pub mod inventory;
pub mod logging;
pub mod parser;
pub mod pipeline;
pub mod reconcile;
pub mod scan;
pub mod sheets;
pub mod vision;

pub use config::AppConfig;
pub use parser::ParsedTables;
pub use reconcile::{build_updates, UpdateTriple};
