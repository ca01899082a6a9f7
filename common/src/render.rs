//! 表示用のビューモデル
//!
//! CLIとデスクトップのどちらも同じ文言・書式で描画するための純粋関数群。

use crate::pagination::PaginationState;
use crate::types::{ImageVariant, LogEntry, Prediction, SegmentationResult};
use crate::urls::{processed_url, upload_url};

/// 値が無いときの表示
pub const PLACEHOLDER: &str = "—";
pub const UPLOAD_PROMPT: &str = "Please upload a pic first.";
pub const NO_LOGS: &str = "No logs yet.";

/// 信頼度を小数2桁＋%で表示
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence)
}

pub fn format_optional_confidence(confidence: Option<f64>) -> String {
    confidence.map(format_confidence).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// `"1. mici: 91.23%"` 形式の順位付き行
pub fn ranked_lines(labels: &[Prediction]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}: {}", i + 1, p.label, format_confidence(p.confidence)))
        .collect()
}

/// 画像の代替テキスト（先頭ラベル）
pub fn image_alt(labels: &[Prediction]) -> String {
    labels
        .first()
        .map(|p| format!("{} - {}", p.label, format_confidence(p.confidence)))
        .unwrap_or_else(|| "Segmentation result".to_string())
}

/// 結果パネルの表示内容
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// エラーバナー
    Error(String),
    /// まだ何も実行していない
    Prompt,
    Ranked {
        banner: String,
        lines: Vec<String>,
        alt: String,
        image_url: Option<String>,
    },
}

/// 結果パネル（状態は画像の切り替えのみ）
#[derive(Debug, Clone, Default)]
pub struct ResultPanel {
    variant: ImageVariant,
    shown_source: Option<String>,
}

impl ResultPanel {
    pub fn variant(&self) -> ImageVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: ImageVariant) {
        self.variant = variant;
    }

    pub fn toggle(&mut self) {
        self.variant = self.variant.toggled();
    }

    /// 新しい元画像が届いたらセグメント表示に戻す
    pub fn sync(&mut self, result: &SegmentationResult) {
        if result.source_image_ref.is_some() && result.source_image_ref != self.shown_source {
            self.variant = ImageVariant::Segmented;
        }
        self.shown_source = result.source_image_ref.clone();
    }

    pub fn view(&self, result: &SegmentationResult, base: Option<&str>) -> ResultView {
        if let Some(error) = &result.error {
            return ResultView::Error(error.to_string());
        }
        let Some(model) = result.model_used.as_deref() else {
            return ResultView::Prompt;
        };

        let image_url = base.and_then(|base| self.image_url(result, base));
        ResultView::Ranked {
            banner: format!("Model Used: {}", model),
            lines: ranked_lines(&result.labels),
            alt: image_alt(&result.labels),
            image_url,
        }
    }

    fn image_url(&self, result: &SegmentationResult, base: &str) -> Option<String> {
        match self.variant {
            ImageVariant::Segmented => result
                .processed_image_ref
                .as_deref()
                .map(|r| processed_url(base, r)),
            ImageVariant::Original => result
                .source_image_ref
                .as_deref()
                .map(|r| upload_url(base, r)),
        }
    }
}

/// ログ表の1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub id: String,
    pub image: String,
    pub model: String,
    pub prediction: String,
    pub confidence: String,
    pub date: String,
}

impl From<&LogEntry> for LogRow {
    fn from(entry: &LogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            image: entry.image_ref.clone(),
            model: entry.model_id.clone(),
            prediction: entry.prediction().unwrap_or(PLACEHOLDER).to_string(),
            confidence: format_optional_confidence(entry.confidence),
            date: entry.timestamp.clone(),
        }
    }
}

/// 詳細表示の項目（ラベル, 値）
pub fn detail_fields(entry: &LogEntry) -> Vec<(&'static str, String)> {
    vec![
        ("Model", crate::catalog::label_for(&entry.model_id).to_string()),
        ("Best Prediction", entry.prediction().unwrap_or(PLACEHOLDER).to_string()),
        ("Highest Confidence", format_optional_confidence(entry.confidence)),
        (
            "Total Detections",
            entry
                .detection_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
        ("Date", entry.timestamp.clone()),
        ("Image", entry.image_ref.clone()),
    ]
}

pub fn page_caption(pagination: &PaginationState) -> String {
    format!("Page {}/{}", pagination.display_page(), pagination.total_pages())
}

pub fn total_caption(pagination: &PaginationState) -> String {
    format!("{} total records", pagination.total_items())
}
