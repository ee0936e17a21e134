//! 認証情報プロバイダ - 取得元ごとの違いをここに閉じ込める
//!
//! クライアントは実行ごとに作り、実行が終われば捨てる。

use crate::auth::{ServiceAccountCredentials, TokenSource};
use crate::config::{CredentialSource, SheetTarget};
use crate::sheets::SheetsClient;
use crate::vision::VisionClient;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// OCR クライアントとシートクライアントを作るもの
pub trait CredentialProvider: Send + Sync {
    /// アクセストークンの取得元を作る
    fn token_source(&self) -> Result<Arc<TokenSource>>;

    /// Vision API クライアント
    fn ocr_client(&self) -> Result<VisionClient> {
        Ok(VisionClient::new(self.token_source()?))
    }

    /// Sheets API クライアント
    fn sheet_client(&self, target: &SheetTarget) -> Result<SheetsClient> {
        Ok(SheetsClient::new(self.token_source()?, target.clone()))
    }
}

/// サービスアカウントJSONファイル
pub struct KeyFileProvider {
    path: PathBuf,
}

impl KeyFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for KeyFileProvider {
    fn token_source(&self) -> Result<Arc<TokenSource>> {
        let credentials = ServiceAccountCredentials::from_file(&self.path)?;
        Ok(Arc::new(TokenSource::service_account(credentials)))
    }
}

/// 環境変数や secrets ファイルから渡された JSON
pub struct InlineJsonProvider {
    json: String,
}

impl InlineJsonProvider {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl CredentialProvider for InlineJsonProvider {
    fn token_source(&self) -> Result<Arc<TokenSource>> {
        let credentials = ServiceAccountCredentials::from_json(&self.json)?;
        Ok(Arc::new(TokenSource::service_account(credentials)))
    }
}

/// 取得済みアクセストークン（`gcloud auth print-access-token` など）
pub struct AccessTokenProvider {
    token: String,
}

impl AccessTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl CredentialProvider for AccessTokenProvider {
    fn token_source(&self) -> Result<Arc<TokenSource>> {
        Ok(Arc::new(TokenSource::fixed(self.token.clone())))
    }
}

/// 設定に合ったプロバイダを選ぶ
pub fn provider_for(source: &CredentialSource) -> Box<dyn CredentialProvider> {
    match source {
        CredentialSource::KeyFile(path) => Box::new(KeyFileProvider::new(path.clone())),
        CredentialSource::Env(json) | CredentialSource::Secrets(json) => {
            Box::new(InlineJsonProvider::new(json.clone()))
        }
        CredentialSource::AccessToken(token) => Box::new(AccessTokenProvider::new(token.clone())),
    }
}
