//! ページング状態

/// ページ移動
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Previous,
    Next,
    Last,
}

/// `{page (1始まり), total_items, page_size}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page: u32,
    total_items: u64,
    page_size: u32,
}

impl PaginationState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            total_items: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 総ページ数（0件でも1ページ）
    pub fn total_pages(&self) -> u32 {
        let pages = self.total_items.div_ceil(u64::from(self.page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// 件数が減った後の古いページ番号を丸めた表示用ページ
    pub fn display_page(&self) -> u32 {
        self.page.min(self.total_pages())
    }

    /// 移動先ページ。境界にいて動けない場合は None
    pub fn target(&self, nav: PageNav) -> Option<u32> {
        let total_pages = self.total_pages();
        match nav {
            PageNav::First | PageNav::Previous if self.page <= 1 => None,
            PageNav::Next | PageNav::Last if self.page >= total_pages => None,
            PageNav::First => Some(1),
            PageNav::Previous => Some((self.page - 1).clamp(1, total_pages)),
            PageNav::Next => Some((self.page + 1).min(total_pages)),
            PageNav::Last => Some(total_pages),
        }
    }

    pub fn can_go(&self, nav: PageNav) -> bool {
        self.target(nav).is_some()
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub(crate) fn set_total_items(&mut self, total_items: u64) {
        self.total_items = total_items;
    }
}
