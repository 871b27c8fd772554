//! フォルダカメラ
//!
//! 端末のDCIMフォルダなど、画像が置かれたフォルダをカメラとして扱う。
//! シャッターごとにファイル名順で次の画像を `file://` URIとして返し、末尾まで来たら先頭に戻る。

use super::{CaptureError, PhotoCapture};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "JPG", "JPEG", "PNG", "HEIC"];

/// フォルダ直下の画像をファイル名順に列挙
pub fn scan_images(folder: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect();

    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    images
}

fn file_uri(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

#[derive(Debug, Clone)]
pub struct FolderCamera {
    folder: PathBuf,
    images: Vec<PathBuf>,
    cursor: usize,
}

impl FolderCamera {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            images: Vec::new(),
            cursor: 0,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

#[async_trait]
impl PhotoCapture for FolderCamera {
    async fn request_permission(&mut self) -> bool {
        match tokio::fs::read_dir(&self.folder).await {
            Ok(_) => true,
            Err(e) => {
                debug!(folder = %self.folder.display(), error = %e, "camera folder not readable");
                false
            }
        }
    }

    async fn capture(&mut self) -> Result<String, CaptureError> {
        if !self.folder.is_dir() {
            return Err(CaptureError::PermissionDenied);
        }

        // 撮影中に画像が追加されることがあるので、空なら毎回スキャンし直す
        if self.images.is_empty() {
            self.images = scan_images(&self.folder);
            self.cursor = 0;
        }
        if self.images.is_empty() {
            return Err(CaptureError::Failure(format!(
                "no images in {}",
                self.folder.display()
            )));
        }

        let path = self.images[self.cursor % self.images.len()].clone();
        self.cursor += 1;

        if let Err(e) = tokio::fs::metadata(&path).await {
            // 消えたファイルは次回スキャンで除外される
            self.images.clear();
            return Err(CaptureError::Failure(format!("{}: {}", path.display(), e)));
        }

        let uri = file_uri(&path);
        debug!(uri = %uri, "captured");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_scan_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("c.jpg")).unwrap();
        File::create(dir.path().join("a.PNG")).unwrap();
        File::create(dir.path().join("b.heic")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        std::fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let names: Vec<String> = scan_images(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.heic", "c.jpg"]);
    }

    #[test]
    fn test_scan_images_missing_folder() {
        assert!(scan_images(Path::new("/nonexistent/crew-photo/dcim")).is_empty());
    }

    #[test]
    fn test_file_uri_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        File::create(&path).unwrap();

        let uri = file_uri(&path);
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("x.jpg"));
    }
}
