//! 結果・ログの型定義
//!
//! CLIとデスクトップで共有される型:
//! - SegmentResponse / LogPage: バックエンドのワイヤ形式
//! - SegmentationResult: 画面に出す最新の解析結果（常に1件）
//! - ImagePayload: 送信する画像（ローカル・リモート共通の形）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1件の検出ラベル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// 0〜100
    pub confidence: f64,
}

/// `POST /segment` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentResponse {
    pub results: Vec<Prediction>,
    /// 保存された元画像のファイル名
    pub image: Option<String>,
    /// `uploads/models/` 配下のオーバーレイ画像
    pub resized_image: Option<String>,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl SegmentResponse {
    /// レスポンス本文をデコード
    ///
    /// JSONでない・形が違う場合は Decode エラー。
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("segment response: {}", e)))
    }
}

/// エラーの発生元（診断用タグ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// 通常アップロード（タグはベースアドレス）
    Upload(String),
    Gallery,
    /// ログからの再実行
    Logs,
}

impl ErrorOrigin {
    pub fn tag(&self) -> &str {
        match self {
            ErrorOrigin::Upload(base) => base,
            ErrorOrigin::Gallery => "Gallery",
            ErrorOrigin::Logs => "Logs",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationError {
    pub message: String,
    pub origin: Option<ErrorOrigin>,
}

impl fmt::Display for SegmentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin.as_ref().map(|o| o.tag()).filter(|tag| !tag.is_empty()) {
            Some(tag) => write!(f, "{} [{}]", self.message, tag),
            None => write!(f, "{}", self.message),
        }
    }
}

/// 最新のセグメンテーション結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentationResult {
    pub labels: Vec<Prediction>,
    pub processed_image_ref: Option<String>,
    pub source_image_ref: Option<String>,
    pub model_used: Option<String>,
    pub error: Option<SegmentationError>,
}

impl SegmentationResult {
    /// エラーのみの結果
    pub fn failure(message: impl Into<String>, origin: Option<ErrorOrigin>) -> Self {
        Self {
            error: Some(SegmentationError {
                message: message.into(),
                origin,
            }),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// レスポンスから結果を組み立てる
    ///
    /// `error` 付きのレスポンスは他のフィールドを信用しない。
    pub fn from_response(response: SegmentResponse) -> Self {
        if let Some(message) = response.error.filter(|m| !m.is_empty()) {
            return Self::failure(message, None);
        }

        let source_image_ref = response.image.filter(|s| !s.is_empty());
        let processed_image_ref = response
            .resized_image
            .filter(|s| !s.is_empty())
            .or_else(|| source_image_ref.as_ref().map(|s| segmented_name(s)));

        Self {
            labels: response.results,
            processed_image_ref,
            source_image_ref,
            model_used: response.model.filter(|m| !m.is_empty()),
            error: None,
        }
    }
}

/// 表示する画像の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageVariant {
    Original,
    #[default]
    Segmented,
}

impl ImageVariant {
    pub fn toggled(self) -> Self {
        match self {
            ImageVariant::Original => ImageVariant::Segmented,
            ImageVariant::Segmented => ImageVariant::Original,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageVariant::Original => "Original",
            ImageVariant::Segmented => "Segmented",
        }
    }
}

/// 派生オーバーレイ画像のファイル名
pub fn segmented_name(file_name: &str) -> String {
    format!("segmented_{}", file_name)
}

/// ログ1件（バックエンド所有、読み取り専用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    #[serde(rename = "image")]
    pub image_ref: String,
    #[serde(rename = "model")]
    pub model_id: String,
    #[serde(rename = "prediction", default)]
    pub best_prediction: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(rename = "num_detections", default)]
    pub detection_count: Option<u32>,
    #[serde(rename = "date", default)]
    pub timestamp: String,
}

impl LogEntry {
    /// 空文字の予測は「なし」扱い
    pub fn prediction(&self) -> Option<&str> {
        self.best_prediction.as_deref().filter(|p| !p.is_empty())
    }

    /// セグメント画像が存在するはずか
    pub fn has_segmented_variant(&self) -> bool {
        self.detection_count.is_some() || self.prediction().is_some()
    }
}

/// `GET /logs` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPage {
    pub items: Vec<LogEntry>,
    pub total: u64,
}

impl LogPage {
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("logs response: {}", e)))
    }
}

/// 送信用の画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// 拡張子からMIMEタイプを推定（不明は image/jpeg）
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "image/jpeg",
    }
}
