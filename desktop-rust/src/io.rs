use anyhow::{Context, Result};
use std::sync::mpsc::Sender;

use foodseg_common::{ErrorOrigin, ImageLocation, SegmentationResult};
use foodseg_dashboard::api::{self, ApiClient, SegmentBackend};
use foodseg_dashboard::error::DashboardError;
use foodseg_dashboard::source;

use crate::model::{ImageData, UiMessage};

/// 画像を解決して送信する（失敗は結果の error に入る）
pub async fn run_segment(
    client: Option<ApiClient>,
    file_name: String,
    location: Option<ImageLocation>,
    model: String,
    origin: ErrorOrigin,
) -> SegmentationResult {
    let Some(location) = location else {
        return SegmentationResult::failure(DashboardError::NotConfigured.to_string(), Some(origin));
    };
    let payload = match source::resolve(client.as_ref(), &file_name, &location).await {
        Ok(payload) => payload,
        Err(err) => return SegmentationResult::failure(err.to_string(), Some(origin)),
    };
    match &client {
        Some(client) => api::submit(client, &payload, &model, origin).await,
        None => SegmentationResult::failure(DashboardError::NotConfigured.to_string(), Some(origin)),
    }
}

pub fn decode_image(key: String, bytes: &[u8], max: (u32, u32)) -> Result<ImageData> {
    let image = image::load_from_memory(bytes).with_context(|| format!("decode {key}"))?;
    let image = image.thumbnail(max.0, max.1);
    let size = [image.width() as usize, image.height() as usize];
    Ok(ImageData {
        key,
        size,
        pixels: image.to_rgba8().into_raw(),
    })
}

async fn read_location(client: Option<&ApiClient>, location: &ImageLocation) -> Result<Vec<u8>> {
    match location {
        ImageLocation::Bundled(path) => {
            std::fs::read(path).with_context(|| format!("read {}", path.display()))
        }
        ImageLocation::Remote(url) => {
            let client = client.context("API base address is not configured")?;
            Ok(client.fetch(url).await?)
        }
    }
}

/// 画像を取得・デコードして送り返す（失敗時も空の画像を送る）
pub async fn load_image(
    client: Option<ApiClient>,
    key: String,
    location: ImageLocation,
    max: (u32, u32),
    tx: Sender<UiMessage>,
) {
    let data = match read_location(client.as_ref(), &location).await {
        Ok(bytes) => decode_image(key.clone(), &bytes, max),
        Err(err) => Err(err),
    };
    let data = data.unwrap_or_else(|err| {
        tracing::warn!(%key, error = %err, "image load failed");
        ImageData::failed(key)
    });
    let _ = tx.send(UiMessage::ImageLoaded(data));
}
