//! セグメンテーションモデルのカタログ
//!
//! バックエンドに送るモデルIDと表示用ラベルの固定テーブル。

/// 選択可能なモデル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    /// バックエンドに送る値
    pub id: &'static str,
    /// 表示専用ラベル
    pub label: &'static str,
}

/// 初期選択モデル
pub const DEFAULT_MODEL: &str = "v0.4-Ultralytics-Hub";

const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption { id: "v0.4-Ultralytics-Hub", label: "v0.4 Ultralytics Hub" },
    ModelOption { id: "v2.1-Ultralytics-Hub", label: "v2.1 Ultralytics Hub" },
    ModelOption { id: "v0.4-Google-Colab", label: "v0.4 Google Colab" },
    ModelOption { id: "v2.1-Google-Colab", label: "v2.1 Google Colab" },
    ModelOption { id: "v0.4-Mici-Google-Colab", label: "Mici! v0.4 Google Colab" },
    ModelOption { id: "v0.4_mici_sarmale_mamaliga", label: "Mici, 2xSarmale, Mamaliga v0.4" },
    ModelOption { id: "v2.1_plus_yorkshire_pudding_gc", label: "Yorkshire Pudding v2.1 GC" },
    ModelOption { id: "v2.1_plus_yorkshire_pudding_uhub", label: "Yorkshire Pudding v2.1 UHUB" },
    ModelOption { id: "yolov8n-seg", label: "yolov8n-seg" },
    ModelOption { id: "yolov8s-seg", label: "yolov8s-seg" },
    ModelOption { id: "yolov8m-seg", label: "yolov8m-seg" },
    ModelOption { id: "yolov8l-seg", label: "yolov8l-seg" },
    ModelOption { id: "yolov8x-seg", label: "yolov8x-seg" },
];

/// 全モデル（宣言順）
pub fn list() -> &'static [ModelOption] {
    MODEL_OPTIONS
}

/// IDからラベルを引く
///
/// カタログに無いID（サーバ側で追加されたモデル等）はそのまま返す。
pub fn label_for(id: &str) -> &str {
    match MODEL_OPTIONS.iter().find(|option| option.id == id) {
        Some(option) => option.label,
        None => id,
    }
}

pub fn contains(id: &str) -> bool {
    MODEL_OPTIONS.iter().any(|option| option.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keeps_declared_order() {
        let ids: Vec<&str> = list().iter().map(|o| o.id).collect();
        assert_eq!(ids.first(), Some(&"v0.4-Ultralytics-Hub"));
        assert_eq!(ids.last(), Some(&"yolov8x-seg"));
        assert_eq!(ids.len(), 13);
    }

    #[test]
    fn test_label_for_known_id() {
        assert_eq!(label_for("v0.4-Mici-Google-Colab"), "Mici! v0.4 Google Colab");
        assert_eq!(label_for("yolov8n-seg"), "yolov8n-seg");
    }

    #[test]
    fn test_label_for_unknown_id_falls_back() {
        assert_eq!(label_for("unknown-id"), "unknown-id");
        assert_eq!(label_for(""), "");
    }

    #[test]
    fn test_default_model_is_in_catalog() {
        assert!(contains(DEFAULT_MODEL));
        assert!(!contains("v9.9-nope"));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = list().iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), list().len());
    }
}
