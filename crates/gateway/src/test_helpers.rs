//! # テスト用共通ヘルパー
//!
//! ストレージに接続せずにハンドラーを検証するためのモック群。

use std::sync::{Arc, Mutex};

use crate::config::{GatewayState, PRESIGN_EXPIRY_SECS};
use crate::storage::{ObjectStorage, StorageError};

pub const TEST_BUCKET: &str = "test-bucket";
pub const TEST_REGION: &str = "us-west-2";

/// モックストレージに対して行われた呼び出し。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    PresignPut {
        key: String,
        content_type: Option<String>,
        expiry_secs: u32,
    },
    PresignGet {
        key: String,
        expiry_secs: u32,
    },
    List {
        prefix: String,
    },
    Put {
        url: String,
        body: Vec<u8>,
        content_type: String,
    },
}

/// テスト用のモックストレージ。
/// 呼び出しを記録し、操作ごとに失敗させることができる。
#[derive(Default)]
pub struct MockStorage {
    pub calls: Mutex<Vec<StorageCall>>,
    pub keys: Vec<String>,
    pub fail_presign: bool,
    pub fail_list: bool,
    pub fail_put: bool,
}

impl MockStorage {
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockStorage {
    async fn presign_put(
        &self,
        object_key: &str,
        content_type: Option<&str>,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.record(StorageCall::PresignPut {
            key: object_key.to_string(),
            content_type: content_type.map(str::to_string),
            expiry_secs,
        });
        if self.fail_presign {
            return Err(StorageError::Presign("InvalidAccessKeyId".to_string()));
        }
        Ok(format!(
            "http://mock-storage/{TEST_BUCKET}/{object_key}?X-Amz-Expires={expiry_secs}&sig=put"
        ))
    }

    async fn presign_get(
        &self,
        object_key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.record(StorageCall::PresignGet {
            key: object_key.to_string(),
            expiry_secs,
        });
        if self.fail_presign {
            return Err(StorageError::Presign("InvalidAccessKeyId".to_string()));
        }
        Ok(format!(
            "http://mock-storage/{TEST_BUCKET}/{object_key}?X-Amz-Expires={expiry_secs}&sig=get"
        ))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.record(StorageCall::List {
            prefix: prefix.to_string(),
        });
        if self.fail_list {
            return Err(StorageError::List("NoSuchBucket".to_string()));
        }
        Ok(self
            .keys
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn put_signed(
        &self,
        signed_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.record(StorageCall::Put {
            url: signed_url.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        if self.fail_put {
            return Err(StorageError::Rejected {
                status: 403,
                body: "<Error><Code>SignatureDoesNotMatch</Code></Error>".to_string(),
            });
        }
        Ok(())
    }
}

/// モックストレージを共有するGatewayState。
/// 呼び出し記録を参照できるよう、ストレージへの `Arc` も返す。
pub fn test_state(storage: MockStorage) -> (Arc<GatewayState>, Arc<MockStorage>) {
    test_state_with_limit(storage, 1024)
}

pub fn test_state_with_limit(
    storage: MockStorage,
    max_upload_bytes: usize,
) -> (Arc<GatewayState>, Arc<MockStorage>) {
    let storage = Arc::new(storage);
    let state = Arc::new(GatewayState {
        storage: Box::new(SharedMock(storage.clone())),
        bucket: TEST_BUCKET.to_string(),
        region: TEST_REGION.to_string(),
        presign_expiry_secs: PRESIGN_EXPIRY_SECS,
        max_upload_bytes,
    });
    (state, storage)
}

/// `Arc<MockStorage>` を `Box<dyn ObjectStorage>` として渡すためのラッパー
struct SharedMock(Arc<MockStorage>);

#[async_trait::async_trait]
impl ObjectStorage for SharedMock {
    async fn presign_put(
        &self,
        object_key: &str,
        content_type: Option<&str>,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.0.presign_put(object_key, content_type, expiry_secs).await
    }

    async fn presign_get(
        &self,
        object_key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        self.0.presign_get(object_key, expiry_secs).await
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.0.list_keys(prefix).await
    }

    async fn put_signed(
        &self,
        signed_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.0.put_signed(signed_url, body, content_type).await
    }
}

pub const TEST_BOUNDARY: &str = "----imgate-test-boundary";

/// multipart/form-data のボディを組み立てる。
/// `parts` は (フィールド名, ファイル名, Content-Type, データ)。
pub fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, content_type, data) in parts {
        body.extend_from_slice(format!("--{TEST_BOUNDARY}\r\n").as_bytes());
        let disposition = match file_name {
            Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{TEST_BOUNDARY}--\r\n").as_bytes());
    body
}

/// multipart/form-data のPOSTリクエストを組み立てる。
pub fn multipart_request(
    uri: &str,
    parts: &[(&str, Option<&str>, Option<&str>, &str)],
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={TEST_BOUNDARY}"),
        )
        .body(axum::body::Body::from(multipart_body(parts)))
        .unwrap()
}
