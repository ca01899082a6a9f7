use std::collections::{HashMap, HashSet};

/// 表示位置ごとに1枚だけ保持する画像
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Result,
    Detail,
}

/// テクスチャのキャッシュ
///
/// サムネイルはキーごとに残し、結果・詳細の画像は表示中の1枚だけ残す。
/// 手放したキーの読み込みが後から届いても捨てる。
pub struct ImageCache<T> {
    loaded: HashMap<String, T>,
    failed: HashSet<String>,
    inflight: HashSet<String>,
    slots: HashMap<ImageSlot, String>,
}

impl<T: Clone> ImageCache<T> {
    pub fn new() -> Self {
        Self {
            loaded: HashMap::new(),
            failed: HashSet::new(),
            inflight: HashSet::new(),
            slots: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.loaded.get(key).cloned()
    }

    pub fn is_failed(&self, key: &str) -> bool {
        self.failed.contains(key)
    }

    /// 読み込みを始めるべきなら true
    pub fn begin(&mut self, key: &str) -> bool {
        if self.loaded.contains_key(key) || self.failed.contains(key) {
            return false;
        }
        self.inflight.insert(key.to_string())
    }

    pub fn is_wanted(&self, key: &str) -> bool {
        self.inflight.contains(key)
    }

    pub fn has_inflight(&self) -> bool {
        !self.inflight.is_empty()
    }

    /// 読み込み結果を反映（None は失敗）。待っていないキーなら false
    pub fn finish(&mut self, key: String, value: Option<T>) -> bool {
        if !self.inflight.remove(&key) {
            return false;
        }
        match value {
            Some(value) => {
                self.loaded.insert(key, value);
            }
            None => {
                self.failed.insert(key);
            }
        }
        true
    }

    /// 表示位置のキーを差し替え、前のキーの画像を手放す
    pub fn track(&mut self, slot: ImageSlot, key: Option<&str>) {
        if self.slots.get(&slot).map(String::as_str) == key {
            return;
        }
        if let Some(previous) = self.slots.remove(&slot) {
            self.forget(&previous);
        }
        if let Some(key) = key {
            self.slots.insert(slot, key.to_string());
        }
    }

    fn forget(&mut self, key: &str) {
        self.loaded.remove(key);
        self.failed.remove(key);
        self.inflight.remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.loaded.len()
    }
}
