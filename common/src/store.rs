//! 最新結果を1件だけ保持するストア
//!
//! 成功した結果を受け取るたびにリロードトークンを進め、
//! 履歴ビューに「再取得せよ」を伝える。

use crate::types::SegmentationResult;
use std::fmt;

/// 再取得シグナル（単調増加）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReloadToken(u64);

impl ReloadToken {
    pub fn value(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        ReloadToken(self.0 + 1)
    }
}

type SuccessObserver = Box<dyn FnMut(ReloadToken) + Send>;

#[derive(Default)]
pub struct ResultStore {
    current: SegmentationResult,
    token: ReloadToken,
    observers: Vec<SuccessObserver>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &SegmentationResult {
        &self.current
    }

    pub fn reload_token(&self) -> ReloadToken {
        self.token
    }

    /// 成功時のみ呼ばれるオブザーバを登録
    pub fn on_success<F>(&mut self, observer: F)
    where
        F: FnMut(ReloadToken) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// 結果を丸ごと置き換える
    ///
    /// エラーなしの結果ならトークンを1つ進めて返す。
    pub fn replace(&mut self, result: SegmentationResult) -> Option<ReloadToken> {
        let success = result.is_success();
        self.current = result;
        if !success {
            return None;
        }

        self.token = self.token.next();
        for observer in &mut self.observers {
            observer(self.token);
        }
        Some(self.token)
    }
}

impl fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStore")
            .field("current", &self.current)
            .field("token", &self.token)
            .field("observers", &self.observers.len())
            .finish()
    }
}
