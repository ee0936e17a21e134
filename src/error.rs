//! 設定エラー

use std::path::PathBuf;
use thiserror::Error;

/// 設定の読み込みで起きるエラー（いずれも実行を中止する）
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SHEET_ID が設定されていません")]
    MissingSheetId,

    #[error("認証情報が見つかりません (GOOGLE_APPLICATION_CREDENTIALS / gcp_service_account / secrets / GOOGLE_ACCESS_TOKEN)")]
    MissingCredentials,

    #[error("不明な認証情報ソース: {0} (file, env, secrets, token のいずれか)")]
    UnknownCredentialSource(String),

    #[error("環境変数 {0} が設定されていません")]
    MissingVar(&'static str),

    #[error("secrets ファイルの読み込みに失敗: {path:?}")]
    SecretsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secrets ファイルのパースに失敗: {path:?}")]
    SecretsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("secrets ファイルに [gcp_service_account] がありません: {0:?}")]
    MissingSecretsTable(PathBuf),

    #[error("認証情報の変換に失敗: {0}")]
    Serialization(#[from] serde_json::Error),
}
