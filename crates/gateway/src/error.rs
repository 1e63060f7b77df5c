//! # Gateway エラー型
//!
//! ハンドラーが返すエラーとHTTPレスポンスへの変換。
//! 呼び出し側には操作ごとの汎用メッセージのみを返し、原因はログにのみ出力する。

use axum::http::StatusCode;
use axum::Json;
use imgate_types::ErrorResponse;

use crate::storage::StorageError;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（メッセージはそのままクライアントに返す）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
    /// アップロードサイズが上限を超えた
    #[error("アップロードサイズ超過: 上限 {limit} バイト")]
    PayloadTooLarge { limit: usize },
    /// ストレージ操作に失敗
    #[error("{context}: {source}")]
    Storage {
        /// クライアントに返す汎用メッセージ
        context: &'static str,
        #[source]
        source: StorageError,
    },
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl GatewayError {
    /// ストレージエラーを、クライアント向けメッセージ付きのエラーに変換する。
    pub fn storage(context: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| GatewayError::Storage { context, source }
    }

    /// HTTPステータスコード。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Storage { .. } | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// レスポンスボディに載せるメッセージ。内部の詳細は含めない。
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::BadRequest(msg) => msg.clone(),
            GatewayError::PayloadTooLarge { limit } => {
                format!("Image exceeds the maximum upload size of {limit} bytes")
            }
            GatewayError::Storage { context, .. } => (*context).to_string(),
            GatewayError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "リクエスト処理に失敗");
        } else {
            tracing::warn!(error = %self, "リクエストを拒否");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
