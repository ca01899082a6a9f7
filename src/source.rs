//! 画像ソースの解決
//!
//! ローカルファイルでもリモート参照でも、同じ ImagePayload の形にして
//! 送信側からは取得元を区別できないようにする。

use crate::api::SegmentBackend;
use crate::error::{DashboardError, Result};
use foodseg_common::{ImageLocation, ImagePayload};
use std::path::Path;

/// 対応する画像拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// ユーザーが選んだローカル画像をそのまま読む
pub fn load_local(path: &Path) -> Result<ImagePayload> {
    if !path.is_file() {
        return Err(DashboardError::FileNotFound(path.display().to_string()));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.jpg".to_string());
    let bytes = std::fs::read(path)?;
    Ok(ImagePayload::new(file_name, bytes))
}

/// ファイル名とアドレスから取得して、アップロードと同じ形に包む
pub async fn resolve_remote<B: SegmentBackend>(backend: &B, file_name: &str, url: &str) -> Result<ImagePayload> {
    let bytes = backend.fetch(url).await?;
    Ok(ImagePayload::new(file_name, bytes))
}

/// 取得先に応じて解決
///
/// リモートはバックエンドが必要。同梱ファイルはネットワーク不要。
pub async fn resolve<B: SegmentBackend>(
    backend: Option<&B>,
    file_name: &str,
    location: &ImageLocation,
) -> Result<ImagePayload> {
    match location {
        ImageLocation::Bundled(path) => {
            let mut payload = load_local(path)?;
            payload.file_name = file_name.to_string();
            Ok(payload)
        }
        ImageLocation::Remote(url) => {
            let backend = backend.ok_or(DashboardError::NotConfigured)?;
            resolve_remote(backend, file_name, url).await
        }
    }
}

/// 対応する画像拡張子か
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
