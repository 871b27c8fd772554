//! エラー型定義

use crate::flow::FlowError;
use crate::route::RouteError;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
