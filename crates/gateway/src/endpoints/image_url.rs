//! # GET /image/{key}
//!
//! 署名付きダウンロードURL発行。

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use imgate_types::ImageUrlResponse;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /image/{key} — 署名付きダウンロードURL発行。
///
/// キーはパスセグメントをそのまま使い、存在確認は行わない。
/// 存在しないキーでもURLは発行され、取得時に初めて失敗する。
/// UTF-8として復号できないキーは400。
pub async fn handle_image_url(
    State(state): State<Arc<GatewayState>>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<ImageUrlResponse>, GatewayError> {
    let Path(key) = key.map_err(|e| {
        tracing::warn!(error = %e, "オブジェクトキーの解析に失敗");
        GatewayError::BadRequest("Invalid object key".to_string())
    })?;

    let image_url = state
        .storage
        .presign_get(&key, state.presign_expiry_secs)
        .await
        .map_err(GatewayError::storage("Error generating image URL"))?;

    tracing::debug!(key = %key, "署名付きダウンロードURLを発行");

    Ok(Json(ImageUrlResponse { image_url }))
}
