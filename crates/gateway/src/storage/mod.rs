//! # オブジェクトストレージ
//!
//! Gatewayが利用するオブジェクトストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。
//!
//! 起動時に一度だけ構築し、`Arc` 経由で全リクエストから共有する。
//! テストではモック実装に差し替える。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use self::s3::S3Storage;

/// ストレージ操作のエラー。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 署名付きURLの生成に失敗
    #[error("署名付きURL生成失敗: {0}")]
    Presign(String),
    /// オブジェクト一覧の取得に失敗
    #[error("オブジェクト一覧取得失敗: {0}")]
    List(String),
    /// 署名付きURLへの転送に失敗（ネットワーク等）
    #[error("転送失敗: {0}")]
    Transfer(String),
    /// 署名付きURLへのPUTが非成功ステータスを返した
    #[error("ストレージがエラーを返しました: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// オブジェクトストレージの抽象インターフェース。
///
/// 署名付きURLの発行はサーバー側に状態を残さない。
/// 対象オブジェクトの存在確認は行わない（アップロード前のキー、削除済みのキーも署名できる）。
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 署名付きアップロードURL（PUT）を生成する。
    ///
    /// `content_type` を指定した場合は署名対象に含まれ、
    /// PUT時に同じ `Content-Type` ヘッダーを送る必要がある。
    async fn presign_put(
        &self,
        object_key: &str,
        content_type: Option<&str>,
        expiry_secs: u32,
    ) -> Result<String, StorageError>;

    /// 署名付きダウンロードURL（GET）を生成する。
    async fn presign_get(&self, object_key: &str, expiry_secs: u32)
        -> Result<String, StorageError>;

    /// プレフィックス配下のオブジェクトキーを列挙する。
    /// 最初の1ページのみを返す（ページングは行わない）。
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// 署名付きURLにオブジェクト本体をPUTする。
    /// 2xx以外のレスポンスは `StorageError::Rejected` とする。
    async fn put_signed(
        &self,
        signed_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
