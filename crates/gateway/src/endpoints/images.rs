//! # GET /images
//!
//! `uploads/` 配下のオブジェクト一覧。各要素には署名なしの公開URLを付与する。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use imgate_types::ImageEntry;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::object_key::{public_object_url, UPLOAD_PREFIX};

/// GET /images — アップロード済みオブジェクトの一覧。
///
/// 先頭1ページのみを返す。オブジェクトがなければ空配列。
pub async fn handle_images(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<Vec<ImageEntry>>, GatewayError> {
    let keys = state
        .storage
        .list_keys(UPLOAD_PREFIX)
        .await
        .map_err(GatewayError::storage("Error retrieving images"))?;

    tracing::debug!(count = keys.len(), "オブジェクト一覧を取得");

    let images = keys
        .into_iter()
        .map(|key| ImageEntry {
            url: public_object_url(&state.bucket, &state.region, &key),
            key,
        })
        .collect();

    Ok(Json(images))
}
