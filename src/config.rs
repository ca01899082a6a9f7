use crate::error::{DashboardError, Result};
use foodseg_common::urls::DEFAULT_ASSETS_DIR;
use foodseg_common::{GalleryMode, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ベースアドレスを上書きする環境変数
pub const API_URL_ENV: &str = "FOODSEG_API_URL";

/// 起動時に一度だけ組み立てて各処理へ渡す設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// バックエンドのベースアドレス（未設定ならギャラリーは同梱画像、ログは取得不可）
    pub api_url: Option<String>,
    pub default_model: String,
    /// オフライン用のキュレーション画像ディレクトリ
    pub assets_dir: PathBuf,
    pub gallery_mode: GalleryMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            default_model: DEFAULT_MODEL.into(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            gallery_mode: GalleryMode::Curated,
        }
    }
}

impl Config {
    /// 設定ファイルを読み、環境変数を反映する
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.override_api_url(Some(url));
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DashboardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("foodseg").join("config.json"))
    }

    /// 空文字は未設定扱い
    pub fn override_api_url(&mut self, url: Option<String>) {
        if let Some(url) = url {
            let url = url.trim().to_string();
            self.api_url = if url.is_empty() { None } else { Some(url) };
        }
    }

    pub fn base(&self) -> Option<&str> {
        self.api_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn api_url(&self) -> Result<&str> {
        self.base().ok_or(DashboardError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert!(matches!(config.api_url(), Err(DashboardError::NotConfigured)));
    }

    #[test]
    fn test_override_api_url() {
        let mut config = Config::default();
        config.override_api_url(Some(" http://localhost:5000 ".to_string()));
        assert_eq!(config.base(), Some("http://localhost:5000"));

        config.override_api_url(None);
        assert_eq!(config.base(), Some("http://localhost:5000"));

        config.override_api_url(Some(String::new()));
        assert_eq!(config.base(), None);
    }
}
