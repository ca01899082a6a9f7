//! サンプル画像ギャラリー
//!
//! キュレーション済みの固定セットか、直近の履歴を表示する。
//! サムネイルをクリックすると、その画像をアップロードしたのと同じ扱いで再解析する。

use crate::store::ReloadToken;
use crate::types::LogPage;
use crate::urls::{curated_location, history_location, ImageLocation};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 履歴モードで取得する件数
pub const GALLERY_PAGE_SIZE: u32 = 9;

pub const CURATED_FILES: &[&str] = &[
    "mici.jpg",
    "sarmale.jpg",
    "mamaliga.jpg",
    "yorkshire_pudding.jpg",
    "plate.jpg",
    "plate05.jpeg",
    "banana3.png",
    "mix_veg1.png",
    "mixed_nuts.png",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryMode {
    #[default]
    Curated,
    History,
}

impl GalleryMode {
    pub fn title(&self) -> &'static str {
        match self {
            GalleryMode::Curated => "Curated Gallery",
            GalleryMode::History => "History Gallery",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            GalleryMode::Curated => {
                "No curated images found. Add files under uploads/gallery or the bundled curated folder."
            }
            GalleryMode::History => "No images yet. Upload a photo first to populate the history.",
        }
    }
}

impl std::str::FromStr for GalleryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "curated" | "c" => Ok(GalleryMode::Curated),
            "history" | "h" => Ok(GalleryMode::History),
            _ => Err(format!("Unknown gallery mode: {}. Use curated or history", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub id: String,
    pub image_ref: String,
}

/// 履歴モードの取得要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryTicket {
    pub page_size: u32,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryLoad {
    /// 項目はすでに揃っている
    Ready,
    /// 呼び出し側が `/logs` を取得して `complete` に渡す
    Fetch(GalleryTicket),
}

#[derive(Debug, Clone, Default)]
pub struct Gallery {
    mode: GalleryMode,
    items: Vec<GalleryItem>,
    running: bool,
    generation: u64,
    reload_token: ReloadToken,
}

impl Gallery {
    pub fn new(mode: GalleryMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> GalleryMode {
        self.mode
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 現在のモードで項目を読み込む
    ///
    /// 履歴モードでベースアドレスが無ければ空リスト。
    pub fn load(&mut self, has_base: bool) -> GalleryLoad {
        self.generation += 1;
        match self.mode {
            GalleryMode::Curated => {
                self.items = curated_items();
                GalleryLoad::Ready
            }
            GalleryMode::History if !has_base => {
                self.items.clear();
                GalleryLoad::Ready
            }
            GalleryMode::History => GalleryLoad::Fetch(GalleryTicket {
                page_size: GALLERY_PAGE_SIZE,
                generation: self.generation,
            }),
        }
    }

    /// モード変更時のみ再読み込み
    pub fn set_mode(&mut self, mode: GalleryMode, has_base: bool) -> Option<GalleryLoad> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        Some(self.load(has_base))
    }

    pub fn observe_reload_token(&mut self, token: ReloadToken, has_base: bool) -> Option<GalleryLoad> {
        if token == self.reload_token {
            return None;
        }
        self.reload_token = token;
        Some(self.load(has_base))
    }

    /// 履歴取得の結果を反映（古い世代やモード変更後の応答は捨てる）
    pub fn complete<E>(&mut self, ticket: GalleryTicket, outcome: Result<LogPage, E>) -> bool {
        if ticket.generation != self.generation || self.mode != GalleryMode::History {
            return false;
        }
        self.items = match outcome {
            Ok(page) => page
                .items
                .into_iter()
                .map(|entry| GalleryItem {
                    id: entry.id.to_string(),
                    image_ref: entry.image_ref,
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        true
    }

    /// 画像の取得先
    pub fn location(&self, base: Option<&str>, assets_dir: &Path, image_ref: &str) -> Option<ImageLocation> {
        match self.mode {
            GalleryMode::Curated => Some(curated_location(base, assets_dir, image_ref)),
            GalleryMode::History => history_location(base, image_ref),
        }
    }

    /// サムネイルのクリック。実行中は無視する
    pub fn begin_run(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    pub fn finish_run(&mut self) {
        self.running = false;
    }
}

fn curated_items() -> Vec<GalleryItem> {
    CURATED_FILES
        .iter()
        .enumerate()
        .map(|(idx, name)| GalleryItem {
            id: format!("c{}", idx),
            image_ref: name.to_string(),
        })
        .collect()
}
