//! # Gatewayクライアント
//!
//! GatewayのHTTP APIを呼び出す薄いラッパー。

use anyhow::{anyhow, bail, Context};
use imgate_types::{
    ErrorResponse, ImageEntry, ImageUrlResponse, UploadImageResponse, UploadUrlQuery,
    UploadUrlResponse,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::de::DeserializeOwned;

/// Gatewayへのクライアント。
pub struct GatewayClient {
    base: Url,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("GatewayのURLが不正です: {base}"))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    /// ベースURLにパスセグメントを追加する。各セグメントはパーセントエンコードされる。
    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("GatewayのURLにパスを追加できません: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 2xxならJSONをデコードし、それ以外はGatewayの `error` をエラーにする。
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| status.to_string());
            bail!("Gatewayがエラーを返しました: HTTP {} - {}", status.as_u16(), message);
        }
        response
            .json::<T>()
            .await
            .context("レスポンスのパースに失敗")
    }

    /// GET /upload-url
    pub async fn request_upload_url(&self, file_name: &str) -> anyhow::Result<UploadUrlResponse> {
        let url = self.endpoint(&["upload-url"])?;
        let response = self
            .http
            .get(url)
            .query(&UploadUrlQuery {
                file_name: file_name.to_string(),
            })
            .send()
            .await
            .context("Gatewayへの送信に失敗")?;
        Self::read_json(response).await
    }

    /// 署名付きURLへファイル本体をPUTする。
    pub async fn put_object(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let response = self
            .http
            .put(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .context("ストレージへの送信に失敗")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("ストレージがエラーを返しました: HTTP {} - {}", status.as_u16(), body);
        }
        Ok(())
    }

    /// 直接アップロード。署名付きURLを取得してからストレージへPUTし、キーを返す。
    pub async fn upload_direct(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<String> {
        let grant = self.request_upload_url(file_name).await?;
        self.put_object(&grant.upload_url, bytes, content_type)
            .await?;
        Ok(grant.key)
    }

    /// POST /upload-image
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<UploadImageResponse> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .with_context(|| format!("Content-Typeが不正です: {content_type}"))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let url = self.endpoint(&["upload-image"])?;
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .context("Gatewayへの送信に失敗")?;
        Self::read_json(response).await
    }

    /// GET /images
    pub async fn images(&self) -> anyhow::Result<Vec<ImageEntry>> {
        let url = self.endpoint(&["images"])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Gatewayへの送信に失敗")?;
        Self::read_json(response).await
    }

    /// GET /image/{key}
    pub async fn image_url(&self, key: &str) -> anyhow::Result<String> {
        let url = self.endpoint(&["image", key])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Gatewayへの送信に失敗")?;
        let body: ImageUrlResponse = Self::read_json(response).await?;
        Ok(body.image_url)
    }
}
