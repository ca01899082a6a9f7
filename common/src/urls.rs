//! バックエンドのアドレス組み立て

use crate::types::segmented_name;
use std::path::{Path, PathBuf};

/// ベースアドレス未設定時に使う同梱キュレーション画像の既定ディレクトリ
pub const DEFAULT_ASSETS_DIR: &str = "imgs/curated";

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

pub fn segment_url(base: &str) -> String {
    format!("{}/segment", trim_base(base))
}

pub fn logs_url(base: &str, page: u32, page_size: u32) -> String {
    format!("{}/logs?page={}&page_size={}", trim_base(base), page, page_size)
}

/// 元画像
pub fn upload_url(base: &str, file_name: &str) -> String {
    format!("{}/uploads/{}", trim_base(base), file_name)
}

/// `segmented_` 付きの派生オーバーレイ画像
pub fn segmented_url(base: &str, file_name: &str) -> String {
    processed_url(base, &segmented_name(file_name))
}

/// `uploads/models/` 配下の処理済み画像
pub fn processed_url(base: &str, processed_ref: &str) -> String {
    format!("{}/uploads/models/{}", trim_base(base), processed_ref)
}

pub fn gallery_url(base: &str, file_name: &str) -> String {
    format!("{}/uploads/gallery/{}", trim_base(base), file_name)
}

/// キャッシュを回避するクエリを付ける
pub fn with_cache_bust(url: &str, token: u64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, sep, token)
}

/// 画像の取得先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    Remote(String),
    /// オフライン用の同梱ファイル
    Bundled(PathBuf),
}

/// キュレーション画像の取得先（ベース未設定なら同梱ファイル）
pub fn curated_location(base: Option<&str>, assets_dir: &Path, file_name: &str) -> ImageLocation {
    match base {
        Some(base) => ImageLocation::Remote(gallery_url(base, file_name)),
        None => ImageLocation::Bundled(assets_dir.join(file_name)),
    }
}

/// 履歴画像の取得先（オフライン代替なし）
pub fn history_location(base: Option<&str>, file_name: &str) -> Option<ImageLocation> {
    base.map(|base| ImageLocation::Remote(upload_url(base, file_name)))
}
