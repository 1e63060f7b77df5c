//! # S3互換ストレージ実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する
//! `ObjectStorage` 実装。署名と一覧取得は rust-s3、署名付きURLへのPUTは reqwest で行う。

use reqwest::header::CONTENT_TYPE;

use super::{ObjectStorage, StorageError};
use crate::config::StorageConfig;

/// S3互換ストレージによる `ObjectStorage` 実装。
pub struct S3Storage {
    bucket: s3::Bucket,
    /// 署名付きURLへのPUT用HTTPクライアント
    http_client: reqwest::Client,
    /// 未設定の設定項目。空でなければ署名・一覧取得を行わずに失敗する。
    /// rust-s3はローカルで署名するため、空の認証情報でもURLを生成してしまう。
    missing: Vec<&'static str>,
}

impl S3Storage {
    pub fn new(bucket: s3::Bucket, http_client: reqwest::Client) -> Self {
        Self {
            bucket,
            http_client,
            missing: Vec::new(),
        }
    }

    /// 未設定の必須項目を列挙する。
    fn missing_fields(config: &StorageConfig) -> Vec<&'static str> {
        [
            ("AWS_ACCESS_KEY_ID", &config.access_key),
            ("AWS_SECRET_ACCESS_KEY", &config.secret_key),
            ("BUCKET_NAME", &config.bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// 必須項目が揃っているか確認する。
    fn ensure_configured(&self) -> Result<(), String> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(format!("ストレージ設定が未設定です: {}", self.missing.join(", ")))
        }
    }

    /// S3互換バケットを初期化する。
    ///
    /// `endpoint` がない場合はAWSのリージョンエンドポイント（仮想ホスト形式）、
    /// ある場合はカスタムエンドポイント（パス形式）を使用する。
    fn init_bucket(config: &StorageConfig) -> anyhow::Result<s3::Bucket> {
        let region = match &config.endpoint {
            Some(endpoint) => s3::Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse::<s3::Region>()?,
        };

        let credentials = s3::creds::Credentials::new(
            Some(config.access_key.as_str()),
            Some(config.secret_key.as_str()),
            None,
            None,
            None,
        )?;

        let bucket = s3::Bucket::new(&config.bucket, region, credentials)?;
        let bucket = if config.endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(*bucket)
    }

    /// 設定から構築する。
    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        if let Some(endpoint) = &config.endpoint {
            tracing::info!(s3_endpoint = %endpoint, "S3互換エンドポイントを使用");
        }
        let bucket = Self::init_bucket(config)?;
        Ok(Self {
            missing: Self::missing_fields(config),
            ..Self::new(bucket, reqwest::Client::new())
        })
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn presign_put(
        &self,
        object_key: &str,
        content_type: Option<&str>,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.ensure_configured().map_err(StorageError::Presign)?;

        let headers = content_type
            .map(|ct| {
                let value = http::HeaderValue::from_str(ct)
                    .map_err(|e| StorageError::Presign(format!("不正なContent-Type: {e}")))?;
                let mut headers = http::HeaderMap::new();
                headers.insert(http::header::CONTENT_TYPE, value);
                Ok::<_, StorageError>(headers)
            })
            .transpose()?;

        self.bucket
            .presign_put(object_key, expiry_secs, headers, None)
            .await
            .map_err(|e| StorageError::Presign(format!("アップロードURL: {e}")))
    }

    async fn presign_get(
        &self,
        object_key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.ensure_configured().map_err(StorageError::Presign)?;

        self.bucket
            .presign_get(object_key, expiry_secs, None)
            .await
            .map_err(|e| StorageError::Presign(format!("ダウンロードURL: {e}")))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.ensure_configured().map_err(StorageError::List)?;

        let (page, _status) = self
            .bucket
            .list_page(prefix.to_string(), None, None, None, None)
            .await
            .map_err(|e| StorageError::List(e.to_string()))?;

        if page.is_truncated {
            tracing::debug!(prefix, "一覧が切り詰められています（先頭ページのみ返却）");
        }

        Ok(page.contents.into_iter().map(|object| object.key).collect())
    }

    async fn put_signed(
        &self,
        signed_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .http_client
            .put(signed_url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Transfer(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
