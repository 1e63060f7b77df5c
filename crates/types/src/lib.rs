//! # imgate 共有型定義
//!
//! GatewayのHTTP APIで受け渡すリクエスト・レスポンスをRust構造体として提供する。
//! Gateway（サーバー側）とCLI（クライアント側）の両方から参照される。
//!
//! ## エンコーディング規則
//! - JSONのフィールド名はcamelCase（`uploadUrl`, `imageUrl`）
//! - オブジェクトキーは `uploads/<UNIXミリ秒>_<ファイル名>` 形式の文字列

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GET /upload-url
// ---------------------------------------------------------------------------

/// /upload-url クエリパラメータ。
///
/// `fileName` が省略された場合は空文字列として扱う。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlQuery {
    /// クライアントが指定するファイル名（検証なし）
    #[serde(default)]
    pub file_name: String,
}

impl UploadUrlQuery {
    /// クエリのキー・値の組から構築する。
    /// `fileName` が複数ある場合は先頭の値を使う。
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file_name = pairs
            .into_iter()
            .find(|(name, _)| name == "fileName")
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { file_name }
    }
}

/// /upload-url レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// アップロード先オブジェクトキー
    pub key: String,
    /// 署名付きアップロードURL（PUT）
    pub upload_url: String,
}

// ---------------------------------------------------------------------------
// POST /upload-image
// ---------------------------------------------------------------------------

/// /upload-image レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadImageResponse {
    pub message: String,
    /// 保存先オブジェクトキー
    pub key: String,
}

// ---------------------------------------------------------------------------
// GET /images
// ---------------------------------------------------------------------------

/// /images レスポンスの1要素。
///
/// `url` は署名なしの公開URL。バケットが公開読み取り可能でない場合は
/// そのままでは取得できないため、/image/{key} の署名付きURLを使うこと。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub key: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// GET /image/{key}
// ---------------------------------------------------------------------------

/// /image/{key} レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrlResponse {
    /// 署名付きダウンロードURL（GET）
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// エラー
// ---------------------------------------------------------------------------

/// 全エンドポイント共通のエラーレスポンス。
/// 内部の詳細は含めず、操作ごとの汎用メッセージのみを返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
