//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//! 認証情報やバケット名が未設定でも起動は失敗せず、最初のストレージ呼び出しでエラーになる。

use std::net::SocketAddr;

use anyhow::Context;

use crate::storage::ObjectStorage;

/// 署名付きURLの有効期限（秒）。リクエストごとに変更できない。
pub const PRESIGN_EXPIRY_SECS: u32 = 3600;

/// プロキシアップロードの既定上限（25 MiB）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// ストレージ接続設定。
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// リージョン（署名と公開URLの両方に使用）
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// S3互換エンドポイント（MinIO, R2等）。未設定ならAWS
    pub endpoint: Option<String>,
}

/// Gateway設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 待ち受けアドレス
    pub addr: SocketAddr,
    pub storage: StorageConfig,
    /// プロキシアップロードで受け付ける最大バイト数
    pub max_upload_bytes: usize,
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の変数参照関数から構築する。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let addr = var("GATEWAY_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("GATEWAY_ADDRが不正です")?;

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTESが不正です: {v}"))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let region = var("AWS_REGION").unwrap_or_else(|| {
            tracing::warn!("AWS_REGIONが未設定です。{DEFAULT_REGION}を使用します");
            DEFAULT_REGION.to_string()
        });

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            var(name).unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };
        let access_key = required("AWS_ACCESS_KEY_ID");
        let secret_key = required("AWS_SECRET_ACCESS_KEY");
        let bucket = required("BUCKET_NAME");
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "ストレージ設定が未設定です。最初のストレージ操作で失敗します"
            );
        }

        Ok(Self {
            addr,
            storage: StorageConfig {
                region,
                access_key,
                secret_key,
                bucket,
                endpoint: var("S3_ENDPOINT"),
            },
            max_upload_bytes,
        })
    }
}

/// Gatewayの共有状態。
///
/// 起動時に一度だけ構築し、`Arc<GatewayState>` として全ハンドラーに注入する。
/// 構築後は変更しない。
pub struct GatewayState {
    /// オブジェクトストレージ（トレイトで抽象化）
    pub storage: Box<dyn ObjectStorage>,
    /// 公開URL生成用バケット名
    pub bucket: String,
    /// 公開URL生成用リージョン
    pub region: String,
    /// 署名付きURLの有効期限（秒）
    pub presign_expiry_secs: u32,
    /// プロキシアップロードの最大サイズ（バイト）
    pub max_upload_bytes: usize,
}

impl GatewayState {
    pub fn new(storage: Box<dyn ObjectStorage>, config: &GatewayConfig) -> Self {
        Self {
            storage,
            bucket: config.storage.bucket.clone(),
            region: config.storage.region.clone(),
            presign_expiry_secs: PRESIGN_EXPIRY_SECS,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
