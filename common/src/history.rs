//! ログ履歴ブラウザ
//!
//! `{page, total, entries, loading}` の状態機械。
//! 取得そのものは呼び出し側が行い、結果を `complete` で戻す。
//! 発行のたびに世代番号を進め、古い世代の応答は捨てる。

use crate::pagination::{PageNav, PaginationState};
use crate::store::ReloadToken;
use crate::types::{ImageVariant, LogEntry, LogPage};
use crate::urls::{segmented_url, upload_url, with_cache_bust};

/// ログ表のページサイズ
pub const LOGS_PAGE_SIZE: u32 = 5;

/// 発行済みの取得要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub page: u32,
    pub page_size: u32,
    generation: u64,
}

/// 再実行の要求（エントリ自身のモデルを使う）
///
/// 完了時に `finish_replay` へそのまま戻す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub entry_id: u64,
    pub image_ref: String,
    pub model_id: String,
    generation: u64,
}

/// 選択中エントリの詳細表示
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    entry: LogEntry,
    variant: ImageVariant,
    cache_bust: u64,
    segmented_ready: bool,
}

impl DetailView {
    fn new(entry: LogEntry, cache_bust: u64) -> Self {
        let segmented_ready = entry.has_segmented_variant();
        Self {
            entry,
            variant: ImageVariant::Original,
            cache_bust,
            segmented_ready,
        }
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub fn variant(&self) -> ImageVariant {
        self.variant
    }

    pub fn cache_bust(&self) -> u64 {
        self.cache_bust
    }

    /// セグメント画像が無いはずの間は切り替え不可
    pub fn can_toggle(&self) -> bool {
        self.segmented_ready
    }

    pub fn toggle(&mut self) -> bool {
        if !self.can_toggle() {
            return false;
        }
        self.variant = self.variant.toggled();
        true
    }

    /// 表示中の画像アドレス（キャッシュ回避付き）
    pub fn image_url(&self, base: &str) -> String {
        let url = match self.variant {
            ImageVariant::Original => upload_url(base, &self.entry.image_ref),
            ImageVariant::Segmented => segmented_url(base, &self.entry.image_ref),
        };
        with_cache_bust(&url, self.cache_bust)
    }

    // 時計が戻っても単調増加を保つ
    fn bump_cache(&mut self, supplied: u64) {
        self.cache_bust = supplied.max(self.cache_bust + 1);
    }
}

#[derive(Debug, Clone)]
pub struct HistoryBrowser {
    pagination: PaginationState,
    entries: Vec<LogEntry>,
    loading: bool,
    generation: u64,
    reload_token: ReloadToken,
    detail: Option<DetailView>,
    last_cache_bust: u64,
    replay_generation: u64,
    // 実行中の再実行の世代（詳細を開き直しても残る）
    replay_in_flight: Option<u64>,
}

impl Default for HistoryBrowser {
    fn default() -> Self {
        Self::new(LOGS_PAGE_SIZE)
    }
}

impl HistoryBrowser {
    pub fn new(page_size: u32) -> Self {
        Self {
            pagination: PaginationState::new(page_size),
            entries: Vec::new(),
            loading: false,
            generation: 0,
            reload_token: ReloadToken::default(),
            detail: None,
            last_cache_bust: 0,
            replay_generation: 0,
            replay_in_flight: None,
        }
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 「ログなし」表示の条件
    pub fn is_empty(&self) -> bool {
        !self.loading && self.entries.is_empty()
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
            generation: self.generation,
        }
    }

    // 1ページ目ならその場で再取得、それ以外は1ページ目へ移動して取得
    fn refresh_first_page(&mut self) -> FetchTicket {
        if self.pagination.page() != 1 {
            self.pagination.set_page(1);
        }
        self.issue()
    }

    /// 初回取得
    pub fn start(&mut self) -> FetchTicket {
        self.issue()
    }

    /// 手動リロード（取得中は無効）
    pub fn reload(&mut self) -> Option<FetchTicket> {
        if self.loading {
            return None;
        }
        Some(self.refresh_first_page())
    }

    /// 外部のリロードトークンを反映
    ///
    /// 変化がなければ何もしない。変化すれば必ず1件だけ要求を出す。
    pub fn observe_reload_token(&mut self, token: ReloadToken) -> Option<FetchTicket> {
        if token == self.reload_token {
            return None;
        }
        self.reload_token = token;
        Some(self.refresh_first_page())
    }

    pub fn can_navigate(&self, nav: PageNav) -> bool {
        !self.loading && self.pagination.can_go(nav)
    }

    pub fn navigate(&mut self, nav: PageNav) -> Option<FetchTicket> {
        if self.loading {
            return None;
        }
        let target = self.pagination.target(nav)?;
        self.pagination.set_page(target);
        Some(self.issue())
    }

    /// ページ番号を直接指定（総件数が未取得でも可、上限は表示側で丸める）
    pub fn go_to(&mut self, page: u32) -> Option<FetchTicket> {
        if self.loading {
            return None;
        }
        self.pagination.set_page(page);
        Some(self.issue())
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// 取得結果を反映
    ///
    /// 古い世代なら捨てて false。失敗時は前のページを残さず空にする。
    pub fn complete<E>(&mut self, ticket: FetchTicket, outcome: Result<LogPage, E>) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        match outcome {
            Ok(page) => {
                self.entries = page.items;
                self.pagination.set_total_items(page.total);
            }
            Err(_) => {
                self.entries.clear();
                self.pagination.set_total_items(0);
            }
        }
        self.loading = false;
        true
    }

    /// エントリの詳細を開く（元画像表示から開始）
    pub fn open_detail(&mut self, id: u64, cache_bust: u64) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id).cloned() else {
            return false;
        };
        let cache_bust = cache_bust.max(self.last_cache_bust + 1);
        self.last_cache_bust = cache_bust;
        self.detail = Some(DetailView::new(entry, cache_bust));
        true
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// 再実行中は切り替えない
    pub fn toggle_detail_variant(&mut self) -> bool {
        if self.replay_in_flight.is_some() {
            return false;
        }
        self.detail.as_mut().is_some_and(|d| d.toggle())
    }

    pub fn is_replaying(&self) -> bool {
        self.replay_in_flight.is_some()
    }

    /// 「もう一度実行」を開始（実行中は別のエントリでも無効）
    pub fn begin_replay(&mut self) -> Option<ReplayRequest> {
        if self.replay_in_flight.is_some() {
            return None;
        }
        let detail = self.detail.as_ref()?;
        self.replay_generation += 1;
        self.replay_in_flight = Some(self.replay_generation);
        Some(ReplayRequest {
            entry_id: detail.entry.id,
            image_ref: detail.entry.image_ref.clone(),
            model_id: detail.entry.model_id.clone(),
            generation: self.replay_generation,
        })
    }

    /// 再実行の完了
    ///
    /// 成功時はセグメント表示に切り替え、キャッシュ回避トークンを進める。
    /// 古い要求や、別のエントリを表示中なら詳細は変えずに false。
    pub fn finish_replay(&mut self, request: &ReplayRequest, success: bool, cache_bust: u64) -> bool {
        if self.replay_in_flight != Some(request.generation) {
            return false;
        }
        self.replay_in_flight = None;
        let Some(detail) = self.detail.as_mut().filter(|d| d.entry.id == request.entry_id) else {
            return false;
        };
        if success {
            detail.segmented_ready = true;
            detail.variant = ImageVariant::Segmented;
            detail.bump_cache(cache_bust);
            self.last_cache_bust = detail.cache_bust;
        }
        true
    }
}
