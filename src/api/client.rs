//! セグメンテーションAPIのHTTPクライアント
//!
//! リトライ・タイムアウトは持たない（呼び出し側の責務）。

use super::SegmentBackend;
use crate::error::{DashboardError, Result};
use foodseg_common::urls::{logs_url, segment_url};
use foodseg_common::{ImagePayload, LogPage, SegmentResponse};
use reqwest::multipart::{Form, Part};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: reqwest::Client::new(),
        }
    }

    /// 2xx以外はステータス付きのエラーにして本文を返す
    async fn read_body(url: &str, response: reqwest::Response) -> Result<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// `image`（バイナリ）と `model`（IDそのまま）の2フィールド
pub fn segment_form(payload: &ImagePayload, model: &str) -> Result<Form> {
    let part = Part::bytes(payload.bytes.clone())
        .file_name(payload.file_name.clone())
        .mime_str(&payload.content_type)?;
    Ok(Form::new().part("image", part).text("model", model.to_string()))
}

impl SegmentBackend for ApiClient {
    fn base(&self) -> &str {
        &self.base
    }

    async fn segment(&self, payload: &ImagePayload, model: &str) -> Result<SegmentResponse> {
        let url = segment_url(&self.base);
        tracing::debug!(%url, file = %payload.file_name, model, "POST segment");

        let form = segment_form(payload, model)?;
        let response = self.http.post(&url).multipart(form).send().await?;
        let body = Self::read_body(&url, response).await?;
        Ok(SegmentResponse::decode(&body)?)
    }

    async fn logs(&self, page: u32, page_size: u32) -> Result<LogPage> {
        let url = logs_url(&self.base, page, page_size);
        tracing::debug!(%url, "GET logs");

        let response = self.http.get(&url).send().await?;
        let body = Self::read_body(&url, response).await?;
        Ok(LogPage::decode(&body)?)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "GET image");
        let response = self.http.get(url).send().await?;
        Self::read_body(url, response).await
    }
}
