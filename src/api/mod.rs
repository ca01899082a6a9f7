//! バックエンド連携
//!
//! - SegmentBackend: `/segment`, `/logs`, 画像取得の3操作
//! - submit: 送信結果を必ず SegmentationResult に正規化する

mod client;

pub use client::{segment_form, ApiClient};

use crate::error::Result;
use foodseg_common::{ErrorOrigin, ImagePayload, LogPage, SegmentResponse, SegmentationResult};

/// セグメンテーションAPI
#[allow(async_fn_in_trait)]
pub trait SegmentBackend {
    /// ベースアドレス
    fn base(&self) -> &str;

    async fn segment(&self, payload: &ImagePayload, model: &str) -> Result<SegmentResponse>;

    async fn logs(&self, page: u32, page_size: u32) -> Result<LogPage>;

    /// 画像のバイト列を取得
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// 画像とモデルIDを送信する
///
/// 通信・デコードの失敗は `error` だけを持つ結果に変換し、
/// メッセージ末尾に発生元タグを付ける。リトライはしない。
pub async fn submit<B: SegmentBackend>(
    backend: &B,
    payload: &ImagePayload,
    model: &str,
    origin: ErrorOrigin,
) -> SegmentationResult {
    match backend.segment(payload, model).await {
        Ok(response) => SegmentationResult::from_response(response),
        Err(err) => {
            tracing::warn!(origin = origin.tag(), error = %err, "segmentation request failed");
            SegmentationResult::failure(err.to_string(), Some(origin))
        }
    }
}
