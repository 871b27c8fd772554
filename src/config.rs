use crate::error::{CrewPhotoError, Result};
use crew_photo_common::ServiceCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// カメラフォルダの環境変数
pub const CAMERA_DIR_ENV: &str = "CREW_PHOTO_CAMERA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// 撮影画像を取り込むフォルダ
    pub camera_dir: Option<PathBuf>,
    /// カスタムサービスカタログ（JSON）
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CrewPhotoError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("crew-photo").join("config.json"))
    }

    /// カメラフォルダ（環境変数を優先）
    pub fn camera_dir(&self) -> Option<PathBuf> {
        match std::env::var(CAMERA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
            _ => self.camera_dir.clone(),
        }
    }

    /// カタログを読み込む（引数 > 設定 > 組み込み）
    pub fn load_catalog(&self, override_path: Option<&Path>) -> Result<ServiceCatalog> {
        match override_path.or(self.catalog_path.as_deref()) {
            Some(path) => {
                if !path.exists() {
                    return Err(CrewPhotoError::FileNotFound(path.display().to_string()));
                }
                Ok(ServiceCatalog::from_file(path)?)
            }
            None => Ok(ServiceCatalog::builtin()),
        }
    }

    pub fn set_camera_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.camera_dir = Some(dir);
        self.save()
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) -> Result<()> {
        self.catalog_path = Some(path);
        self.save()
    }
}
