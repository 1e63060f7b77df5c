//! # POST /upload-image
//!
//! プロキシアップロード。クライアントから受け取ったファイルを
//! Gatewayが署名付きURLへPUTして中継する。
//!
//! ファイルはチャンク単位で読み込み、`max_upload_bytes` を超えた時点で413で拒否する。
//! S3の署名付きPUTは `Content-Length` を要求するため、転送前にメモリ上へ集める。

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use imgate_types::UploadImageResponse;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::object_key::new_upload_key;

/// ファイルを受け取るmultipartフィールド名
pub const IMAGE_FIELD: &str = "image";

/// パートにContent-Typeがない場合のMIMEタイプ
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const NO_FILE_MESSAGE: &str = "No image file provided";

/// multipartから取り出したファイル。
struct UploadedFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// `image` フィールドを読み込む。見つからなければ `None`。
async fn read_image_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<Option<UploadedFile>, GatewayError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "multipartの読み取りに失敗");
        GatewayError::BadRequest("Invalid multipart body".to_string())
    })? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            tracing::warn!(error = %e, "ファイル本体の読み取りに失敗");
            GatewayError::BadRequest("Invalid multipart body".to_string())
        })? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(GatewayError::PayloadTooLarge { limit: max_bytes });
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Some(UploadedFile {
            name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

/// POST /upload-image — プロキシアップロード。
///
/// 署名付きPUT URLを発行してから本体をPUTする。PUTが失敗しても
/// リトライや後始末は行わない。
pub async fn handle_upload_image(
    State(state): State<Arc<GatewayState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImageResponse>, GatewayError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "multipartリクエストではありません");
        GatewayError::BadRequest(NO_FILE_MESSAGE.to_string())
    })?;

    let file = match read_image_field(&mut multipart, state.max_upload_bytes).await? {
        Some(file) if !file.bytes.is_empty() => file,
        _ => return Err(GatewayError::BadRequest(NO_FILE_MESSAGE.to_string())),
    };

    let key = new_upload_key(&file.name)?;
    let size = file.bytes.len();

    let upload_url = state
        .storage
        .presign_put(&key, Some(file.content_type.as_str()), state.presign_expiry_secs)
        .await
        .map_err(GatewayError::storage("Error uploading image"))?;

    state
        .storage
        .put_signed(&upload_url, file.bytes, &file.content_type)
        .await
        .map_err(GatewayError::storage("Error uploading image"))?;

    tracing::info!(
        key = %key,
        bytes = size,
        content_type = %file.content_type,
        "画像をアップロード"
    );

    Ok(Json(UploadImageResponse {
        message: "Image uploaded successfully".to_string(),
        key,
    }))
}
