//! # GET /upload-url
//!
//! 直接アップロード用の署名付きURL発行。
//! ファイル本体はGatewayを経由せず、クライアントが署名付きURLへ直接PUTする。

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use imgate_types::{UploadUrlQuery, UploadUrlResponse};

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::object_key::new_upload_key;

/// GET /upload-url — 署名付きアップロードURL発行。
///
/// `fileName` は検証せずにキーへ埋め込む。発行したキーがそのままPUT先になる。
/// クエリはキー・値の組として受け取り、`fileName` の重複も拒否しない（先頭を採用）。
pub async fn handle_upload_url(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<UploadUrlResponse>, GatewayError> {
    let Query(pairs) = query.map_err(|e| {
        tracing::warn!(error = %e, "クエリ文字列の解析に失敗");
        GatewayError::BadRequest("Invalid query string".to_string())
    })?;
    let query = UploadUrlQuery::from_pairs(pairs);

    let key = new_upload_key(&query.file_name)?;

    let upload_url = state
        .storage
        .presign_put(&key, None, state.presign_expiry_secs)
        .await
        .map_err(GatewayError::storage("Error generating upload URL"))?;

    tracing::info!(key = %key, "署名付きアップロードURLを発行");

    Ok(Json(UploadUrlResponse { key, upload_url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{test_state, MockStorage, StorageCall};

    fn query(name: &str) -> Result<Query<Vec<(String, String)>>, QueryRejection> {
        Ok(Query(vec![("fileName".to_string(), name.to_string())]))
    }

    #[tokio::test]
    async fn test_upload_url_key_and_url_match() {
        let (state, storage) = test_state(MockStorage::default());

        let response = handle_upload_url(State(state), query("cat.png"))
            .await
            .unwrap()
            .0;

        let ts = response
            .key
            .strip_prefix("uploads/")
            .and_then(|rest| rest.strip_suffix("_cat.png"))
            .unwrap();
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert!(response.upload_url.contains(&response.key));

        let calls = storage.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![StorageCall::PresignPut {
                key: response.key.clone(),
                content_type: None,
                expiry_secs: 3600,
            }]
        );
    }

    /// 異なる時刻の同名リクエストは異なるキーになる
    #[tokio::test]
    async fn test_upload_url_distinct_keys_over_time() {
        let (state, _) = test_state(MockStorage::default());

        let first = handle_upload_url(State(state.clone()), query("a.jpg"))
            .await
            .unwrap()
            .0;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = handle_upload_url(State(state), query("a.jpg"))
            .await
            .unwrap()
            .0;

        assert_ne!(first.key, second.key);
    }

    #[tokio::test]
    async fn test_upload_url_empty_name_accepted() {
        let (state, _) = test_state(MockStorage::default());

        let response = handle_upload_url(State(state), query("")).await.unwrap().0;
        assert!(response.key.starts_with("uploads/"));
        assert!(response.key.ends_with('_'));
    }

    /// fileNameの重複は先頭を採用する
    #[tokio::test]
    async fn test_upload_url_duplicate_file_name_uses_first() {
        let (state, _) = test_state(MockStorage::default());
        let pairs = vec![
            ("fileName".to_string(), "a.png".to_string()),
            ("fileName".to_string(), "b.png".to_string()),
        ];

        let response = handle_upload_url(State(state), Ok(Query(pairs)))
            .await
            .unwrap()
            .0;
        assert!(response.key.ends_with("_a.png"));
    }

    #[tokio::test]
    async fn test_upload_url_presign_failure() {
        let (state, _) = test_state(MockStorage {
            fail_presign: true,
            ..Default::default()
        });

        let err = handle_upload_url(State(state), query("a.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error generating upload URL");
    }
}
