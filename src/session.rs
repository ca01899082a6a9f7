//! ダッシュボードのセッション
//!
//! 入力画像の選択 → 送信 → 結果表示 → 履歴に反映 → 履歴から再実行、
//! の流れを1か所でつなぐ。状態遷移そのものは foodseg_common 側の状態機械が持ち、
//! ここでは取得を実行して結果を戻すだけ。

use crate::api::{self, ApiClient, SegmentBackend};
use crate::config::Config;
use crate::error::DashboardError;
use crate::source;
use foodseg_common::urls::history_location;
use foodseg_common::{
    catalog, ErrorOrigin, FetchTicket, Gallery, GalleryLoad, GalleryMode, HistoryBrowser,
    ImagePayload, PageNav, ResultPanel, ResultStore, ResultView, SegmentationResult,
};
use std::path::{Path, PathBuf};

pub struct Session<B> {
    backend: Option<B>,
    assets_dir: PathBuf,
    selected_model: String,
    store: ResultStore,
    panel: ResultPanel,
    history: HistoryBrowser,
    gallery: Gallery,
}

impl Session<ApiClient> {
    /// 設定からHTTPクライアント付きで組み立てる
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base().map(ApiClient::new), config)
    }
}

impl<B: SegmentBackend> Session<B> {
    pub fn new(backend: Option<B>, config: &Config) -> Self {
        Self {
            backend,
            assets_dir: config.assets_dir.clone(),
            selected_model: config.default_model.clone(),
            store: ResultStore::new(),
            panel: ResultPanel::default(),
            history: HistoryBrowser::default(),
            gallery: Gallery::new(config.gallery_mode),
        }
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn base(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.base())
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// カタログ外のIDもそのまま送る（警告のみ）
    pub fn select_model(&mut self, id: &str) {
        if !catalog::contains(id) {
            tracing::warn!(model = id, "model is not in the catalog; sending as-is");
        }
        self.selected_model = id.to_string();
    }

    pub fn result(&self) -> &SegmentationResult {
        self.store.current()
    }

    pub fn result_view(&self) -> ResultView {
        self.panel.view(self.store.current(), self.base())
    }

    pub fn toggle_result_image(&mut self) {
        self.panel.toggle();
    }

    pub fn history(&self) -> &HistoryBrowser {
        &self.history
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn reload_token(&self) -> foodseg_common::ReloadToken {
        self.store.reload_token()
    }

    /// ログが表示できない理由（未設定時）
    pub fn logs_notice(&self) -> Option<String> {
        match self.backend {
            Some(_) => None,
            None => Some(DashboardError::NotConfigured.to_string()),
        }
    }

    /// 初回表示：ログ1ページ目とギャラリーを読み込む
    pub async fn start(&mut self) {
        let ticket = self.history.start();
        self.fetch_history(ticket).await;
        self.load_gallery().await;
    }

    async fn fetch_history(&mut self, ticket: FetchTicket) {
        let outcome = match &self.backend {
            Some(backend) => backend.logs(ticket.page, ticket.page_size).await,
            None => Err(DashboardError::NotConfigured),
        };
        if let Err(err) = &outcome {
            tracing::warn!(page = ticket.page, error = %err, "Error fetching logs");
        }
        self.history.complete(ticket, outcome);
    }

    async fn apply_gallery_load(&mut self, load: GalleryLoad) {
        let GalleryLoad::Fetch(ticket) = load else {
            return;
        };
        let outcome = match &self.backend {
            Some(backend) => backend.logs(1, ticket.page_size).await,
            None => Err(DashboardError::NotConfigured),
        };
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "Error fetching gallery history");
        }
        self.gallery.complete(ticket, outcome);
    }

    async fn submit_payload(&self, payload: &ImagePayload, model: &str, origin: ErrorOrigin) -> SegmentationResult {
        match &self.backend {
            Some(backend) => api::submit(backend, payload, model, origin).await,
            None => SegmentationResult::failure(DashboardError::NotConfigured.to_string(), Some(origin)),
        }
    }

    /// 結果を反映し、成功ならリロードトークン経由で履歴とギャラリーを更新
    async fn apply_result(&mut self, result: SegmentationResult) {
        self.panel.sync(&result);
        let Some(token) = self.store.replace(result) else {
            return;
        };
        if let Some(ticket) = self.history.observe_reload_token(token) {
            self.fetch_history(ticket).await;
        }
        if let Some(load) = self.gallery.observe_reload_token(token, self.backend.is_some()) {
            self.apply_gallery_load(load).await;
        }
    }

    /// ローカル画像をアップロード
    pub async fn upload(&mut self, path: &Path) -> &SegmentationResult {
        let origin = ErrorOrigin::Upload(self.base().unwrap_or_default().to_string());
        let model = self.selected_model.clone();
        if !source::is_image_file(path) {
            tracing::warn!(path = %path.display(), "not a known image extension; sending as-is");
        }
        let result = match source::load_local(path) {
            Ok(payload) => self.submit_payload(&payload, &model, origin).await,
            Err(err) => SegmentationResult::failure(err.to_string(), Some(origin)),
        };
        self.apply_result(result).await;
        self.store.current()
    }

    /// ギャラリー画像を選択中のモデルで実行（実行中なら false）
    pub async fn run_gallery(&mut self, image_ref: &str) -> bool {
        if !self.gallery.begin_run() {
            return false;
        }
        let model = self.selected_model.clone();
        let location = self.gallery.location(self.base(), &self.assets_dir, image_ref);
        let result = match location {
            Some(location) => match source::resolve(self.backend.as_ref(), image_ref, &location).await {
                Ok(payload) => self.submit_payload(&payload, &model, ErrorOrigin::Gallery).await,
                Err(err) => SegmentationResult::failure(err.to_string(), Some(ErrorOrigin::Gallery)),
            },
            None => SegmentationResult::failure(
                DashboardError::NotConfigured.to_string(),
                Some(ErrorOrigin::Gallery),
            ),
        };
        self.gallery.finish_run();
        self.apply_result(result).await;
        true
    }

    pub async fn load_gallery(&mut self) {
        let load = self.gallery.load(self.backend.is_some());
        self.apply_gallery_load(load).await;
    }

    pub async fn set_gallery_mode(&mut self, mode: GalleryMode) {
        if let Some(load) = self.gallery.set_mode(mode, self.backend.is_some()) {
            self.apply_gallery_load(load).await;
        }
    }

    /// ページ移動（取得中・境界では何もしない）
    pub async fn navigate(&mut self, nav: PageNav) -> bool {
        match self.history.navigate(nav) {
            Some(ticket) => {
                self.fetch_history(ticket).await;
                true
            }
            None => false,
        }
    }

    /// 指定ページを開く
    pub async fn open_page(&mut self, page: u32) -> bool {
        match self.history.go_to(page) {
            Some(ticket) => {
                self.fetch_history(ticket).await;
                true
            }
            None => false,
        }
    }

    pub async fn reload_logs(&mut self) -> bool {
        match self.history.reload() {
            Some(ticket) => {
                self.fetch_history(ticket).await;
                true
            }
            None => false,
        }
    }

    pub fn open_log(&mut self, id: u64) -> bool {
        self.history.open_detail(id, cache_bust_now())
    }

    pub fn close_log(&mut self) {
        self.history.close_detail();
    }

    pub fn toggle_log_image(&mut self) -> bool {
        self.history.toggle_detail_variant()
    }

    /// 詳細表示中の画像アドレス
    pub fn log_image_url(&self) -> Option<String> {
        let base = self.base()?;
        self.history.detail().map(|detail| detail.image_url(base))
    }

    /// 詳細表示中のエントリを、そのエントリのモデルで再実行
    pub async fn replay(&mut self) -> bool {
        let Some(request) = self.history.begin_replay() else {
            return false;
        };
        tracing::debug!(id = request.entry_id, model = %request.model_id, "replaying log entry");

        let result = match history_location(self.base(), &request.image_ref) {
            Some(location) => match source::resolve(self.backend.as_ref(), &request.image_ref, &location).await {
                Ok(payload) => self.submit_payload(&payload, &request.model_id, ErrorOrigin::Logs).await,
                Err(err) => SegmentationResult::failure(err.to_string(), Some(ErrorOrigin::Logs)),
            },
            None => SegmentationResult::failure(
                DashboardError::NotConfigured.to_string(),
                Some(ErrorOrigin::Logs),
            ),
        };
        self.history.finish_replay(&request, result.is_success(), cache_bust_now());
        self.apply_result(result).await;
        true
    }
}

/// キャッシュ回避用の時刻トークン（ミリ秒）
pub fn cache_bust_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
