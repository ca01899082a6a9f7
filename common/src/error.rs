//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// レスポンス本文の形が想定と違う
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
