use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("API base address is not configured. Set FOODSEG_API_URL or run `foodseg config --set-api-url URL`")]
    NotConfigured,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("ログが見つかりません: #{0}")]
    UnknownLog(u64),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Common(#[from] foodseg_common::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
