//! 設定 - 環境変数（.env を含む）と secrets ファイルから読み込む

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 在庫ワークシート名
pub const DEFAULT_SHEET_NAME: &str = "Inventory";
/// サービスアカウントJSONの既定パス
pub const DEFAULT_KEY_PATH: &str = "credentials/service-account.json";
/// secrets ファイルの既定パス
pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

/// 書き込み先のスプレッドシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

impl SheetTarget {
    /// ブラウザで開くURL
    pub fn url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            self.spreadsheet_id
        )
    }
}

/// ヘッダー行の列名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub product: String,
    pub location: String,
    pub qty: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            product: "ProductCode".to_string(),
            location: "Location".to_string(),
            qty: "Qty".to_string(),
        }
    }
}

/// 認証情報の取得元
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// サービスアカウントJSONファイル
    KeyFile(PathBuf),
    /// 環境変数 `gcp_service_account` に入ったJSON
    Env(String),
    /// secrets ファイルの `[gcp_service_account]` テーブル（JSONに変換済み）
    Secrets(String),
    /// 取得済みのアクセストークン
    AccessToken(String),
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
            Self::Env(_) => f.write_str("Env(<redacted>)"),
            Self::Secrets(_) => f.write_str("Secrets(<redacted>)"),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sheet: SheetTarget,
    pub columns: ColumnNames,
    pub credentials: CredentialSource,
}

/// secrets ファイルの内容
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    sheet_id: Option<String>,
    gcp_service_account: Option<toml::Table>,
}

impl Secrets {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SecretsRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::SecretsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl AppConfig {
    /// 環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の変数ルックアップから読み込む
    ///
    /// - `SHEET_ID`（なければ secrets の `sheet_id`）: 必須
    /// - `SHEET_NAME`: 既定は `Inventory`
    /// - `CREDENTIALS_SOURCE`: `file` / `env` / `secrets` / `token`。未指定なら自動判定
    /// - `SECRETS_PATH`: 既定は `.streamlit/secrets.toml`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secrets_path = PathBuf::from(
            var("SECRETS_PATH").unwrap_or_else(|| DEFAULT_SECRETS_PATH.to_string()),
        );
        let secrets = if secrets_path.is_file() {
            Secrets::load(&secrets_path)?
        } else {
            Secrets::default()
        };

        let spreadsheet_id = var("SHEET_ID")
            .or_else(|| secrets.sheet_id.clone().filter(|v| !v.trim().is_empty()))
            .ok_or(ConfigError::MissingSheetId)?;

        let sheet = SheetTarget {
            spreadsheet_id,
            sheet_name: var("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
        };

        let key_path = || {
            PathBuf::from(
                var("GOOGLE_APPLICATION_CREDENTIALS").unwrap_or_else(|| DEFAULT_KEY_PATH.to_string()),
            )
        };
        let secrets_json = |secrets: &Secrets| -> Result<Option<String>, ConfigError> {
            match secrets.gcp_service_account.as_ref() {
                Some(table) => Ok(Some(serde_json::to_string(table)?)),
                None => Ok(None),
            }
        };

        let credentials = match var("CREDENTIALS_SOURCE").as_deref().map(str::trim) {
            Some("file") => CredentialSource::KeyFile(key_path()),
            Some("env") => CredentialSource::Env(
                var("gcp_service_account").ok_or(ConfigError::MissingVar("gcp_service_account"))?,
            ),
            Some("secrets") => CredentialSource::Secrets(
                secrets_json(&secrets)?.ok_or(ConfigError::MissingSecretsTable(secrets_path.clone()))?,
            ),
            Some("token") => CredentialSource::AccessToken(
                var("GOOGLE_ACCESS_TOKEN").ok_or(ConfigError::MissingVar("GOOGLE_ACCESS_TOKEN"))?,
            ),
            Some(other) => return Err(ConfigError::UnknownCredentialSource(other.to_string())),
            None => {
                if var("GOOGLE_APPLICATION_CREDENTIALS").is_some() || key_path().is_file() {
                    CredentialSource::KeyFile(key_path())
                } else if let Some(json) = var("gcp_service_account") {
                    CredentialSource::Env(json)
                } else if let Some(json) = secrets_json(&secrets)? {
                    CredentialSource::Secrets(json)
                } else if let Some(token) = var("GOOGLE_ACCESS_TOKEN") {
                    CredentialSource::AccessToken(token)
                } else {
                    return Err(ConfigError::MissingCredentials);
                }
            }
        };

        tracing::debug!("認証情報ソース: {:?}", credentials);

        Ok(Self {
            sheet,
            columns: ColumnNames::default(),
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // カレントディレクトリの .streamlit を拾わないようにする
        map.entry("SECRETS_PATH".to_string())
            .or_insert_with(|| "/nonexistent/secrets.toml".to_string());
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_sheet_id_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[("GOOGLE_ACCESS_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSheetId));
    }

    #[test]
    fn blank_sheet_id_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[("SHEET_ID", "  "), ("GOOGLE_ACCESS_TOKEN", "t")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSheetId));
    }

    #[test]
    fn defaults_are_applied() {
        let config =
            AppConfig::from_lookup(lookup(&[("SHEET_ID", "abc"), ("GOOGLE_ACCESS_TOKEN", "t")])).unwrap();
        assert_eq!(config.sheet.spreadsheet_id, "abc");
        assert_eq!(config.sheet.sheet_name, "Inventory");
        assert_eq!(config.columns, ColumnNames::default());
        assert_eq!(config.credentials, CredentialSource::AccessToken("t".into()));
    }

    #[test]
    fn key_file_wins_auto_detection() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SHEET_ID", "abc"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/key.json"),
            ("gcp_service_account", "{}"),
        ]))
        .unwrap();
        assert_eq!(config.credentials, CredentialSource::KeyFile("/tmp/key.json".into()));
    }

    #[test]
    fn env_json_is_detected() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SHEET_ID", "abc"),
            ("gcp_service_account", r#"{"client_email":"a"}"#),
        ]))
        .unwrap();
        assert!(matches!(config.credentials, CredentialSource::Env(_)));
    }

    #[test]
    fn explicit_source_must_be_known() {
        let err = AppConfig::from_lookup(lookup(&[
            ("SHEET_ID", "abc"),
            ("CREDENTIALS_SOURCE", "vault"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCredentialSource(s) if s == "vault"));
    }

    #[test]
    fn explicit_env_source_requires_variable() {
        let err = AppConfig::from_lookup(lookup(&[("SHEET_ID", "abc"), ("CREDENTIALS_SOURCE", "env")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("gcp_service_account")));
    }

    #[test]
    fn nothing_configured_means_missing_credentials() {
        let err = AppConfig::from_lookup(lookup(&[("SHEET_ID", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn secrets_file_provides_sheet_id_and_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(
            &path,
            r#"
sheet_id = "from-secrets"

[gcp_service_account]
client_email = "bot@example.com"
private_key = "key"
"#,
        )
        .unwrap();

        let config =
            AppConfig::from_lookup(lookup(&[("SECRETS_PATH", path.to_str().unwrap())])).unwrap();
        assert_eq!(config.sheet.spreadsheet_id, "from-secrets");
        let CredentialSource::Secrets(json) = &config.credentials else {
            panic!("expected secrets source, got {:?}", config.credentials);
        };
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["client_email"], "bot@example.com");
    }

    #[test]
    fn broken_secrets_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "sheet_id = [").unwrap();
        let err = AppConfig::from_lookup(lookup(&[("SECRETS_PATH", path.to_str().unwrap())]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::SecretsParse { .. }));
    }

    #[test]
    fn credentials_are_not_printed() {
        let source = CredentialSource::Env("secret-json".into());
        assert!(!format!("{:?}", source).contains("secret-json"));
    }
}
