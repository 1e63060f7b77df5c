//! # imgate Gateway
//!
//! オブジェクトストレージへの署名付きURLを発行するHTTP Gateway。
//!
//! ## 役割
//! - 直接アップロード用の署名付きURL発行（ファイル本体はGatewayを経由しない）
//! - プロキシアップロード（Gatewayが受け取り、署名付きURLへ中継）
//! - アップロード済みオブジェクトの一覧
//! - 署名付きダウンロードURL発行
//!
//! ## API エンドポイント
//! - `GET /upload-url?fileName=` — 署名付きアップロードURL発行
//! - `POST /upload-image` — multipart `image` フィールドのプロキシアップロード
//! - `GET /images` — `uploads/` 配下の一覧（公開URL付き）
//! - `GET /image/{key}` — 署名付きダウンロードURL発行

mod config;
mod endpoints;
mod error;
mod object_key;
mod storage;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use config::{GatewayConfig, GatewayState};
use endpoints::{handle_image_url, handle_images, handle_upload_image, handle_upload_url};
use storage::S3Storage;

/// Gatewayのルーターを構築する。
///
/// /upload-image はaxumの既定ボディ上限を外し、ハンドラー側の
/// `max_upload_bytes` で読み込み量を制限する。
fn build_router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route("/upload-url", get(handle_upload_url))
        .route(
            "/upload-image",
            post(handle_upload_image).layer(DefaultBodyLimit::disable()),
        )
        .route("/images", get(handle_images))
        .route("/image/{key}", get(handle_image_url))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .envがあれば読み込む（なくてもよい）
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;

    let storage = S3Storage::from_config(&config.storage)?;
    let state = Arc::new(GatewayState::new(Box::new(storage), &config));

    tracing::info!(
        bucket = %config.storage.bucket,
        region = %config.storage.region,
        max_upload_bytes = config.max_upload_bytes,
        "ストレージ設定"
    );

    let app = build_router(state);

    tracing::info!("Gatewayを {} で起動します", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
