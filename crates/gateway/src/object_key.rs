//! # オブジェクトキーと公開URL
//!
//! アップロード先キーは `uploads/<UNIXミリ秒>_<ファイル名>`。
//! 調整なしで一意性を得るためにタイムスタンプを使う。同一ミリ秒・同一ファイル名の衝突は許容する。
//! ファイル名は検証しない（空文字列やパス区切りを含む値もそのまま使う）。

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::GatewayError;

/// アップロードされたオブジェクトを置くプレフィックス
pub const UPLOAD_PREFIX: &str = "uploads/";

/// 現在時刻のUNIXミリ秒。
pub fn now_millis() -> Result<u128, GatewayError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| GatewayError::Internal(format!("時刻取得失敗: {e}")))?
        .as_millis())
}

/// アップロード先オブジェクトキーを組み立てる。
pub fn upload_key(millis: u128, file_name: &str) -> String {
    format!("{UPLOAD_PREFIX}{millis}_{file_name}")
}

/// 現在時刻でアップロード先オブジェクトキーを組み立てる。
pub fn new_upload_key(file_name: &str) -> Result<String, GatewayError> {
    Ok(upload_key(now_millis()?, file_name))
}

/// 署名なしの公開URL。
/// バケットが公開読み取り可能な場合にのみ利用できる。
pub fn public_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}
