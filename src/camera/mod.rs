//! 撮影アダプタ
//!
//! 実際のカメラはホスト側の機能。ワークフローは撮影ごとに返る画像URIだけを扱う。
//! 撮影は一度に一つだけで、完了（URI）か失敗で終わる。

mod folder;

pub use folder::{scan_images, FolderCamera};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera access denied")]
    PermissionDenied,

    #[error("capture failed: {0}")]
    Failure(String),
}

#[async_trait]
pub trait PhotoCapture: Send {
    /// カメラ使用許可を要求
    async fn request_permission(&mut self) -> bool;

    /// 1枚撮影して画像URIを返す
    async fn capture(&mut self) -> Result<String, CaptureError>;
}
