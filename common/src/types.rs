//! 写真記録の型定義
//!
//! - PhotoSet: サービスごとの写真セット（メイン / ルーラー）
//! - PhotoRecord: 撮影した画像のURIと撮影時刻

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 写真セットの種類
///
/// サービスの写真列は先頭からメイン5枚、続いてルーラー3枚に区切られる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSet {
    /// 全景・作業状況の記録
    #[default]
    Main,
    /// 寸法確認用（定規を写し込む）
    Ruler,
}

impl PhotoSet {
    /// メイン写真の必要枚数
    pub const MAIN_COUNT: usize = 5;
    /// ルーラー写真の必要枚数
    pub const RULER_COUNT: usize = 3;

    /// このセットで撮影が必要な枚数
    pub fn required_count(self) -> usize {
        match self {
            PhotoSet::Main => Self::MAIN_COUNT,
            PhotoSet::Ruler => Self::RULER_COUNT,
        }
    }

    /// 写真列の中でこのセットが始まる位置
    pub fn offset(self) -> usize {
        match self {
            PhotoSet::Main => 0,
            PhotoSet::Ruler => Self::MAIN_COUNT,
        }
    }

    /// 写真列の中でこのセットが占める範囲
    pub fn range(self) -> Range<usize> {
        self.offset()..self.offset() + self.required_count()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSet::Main => "main",
            PhotoSet::Ruler => "ruler",
        }
    }

    /// 画面見出し
    pub fn title(self) -> &'static str {
        match self {
            PhotoSet::Main => "Main Photos",
            PhotoSet::Ruler => "Ruler Photos",
        }
    }
}

impl std::str::FromStr for PhotoSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" => Ok(PhotoSet::Main),
            "ruler" => Ok(PhotoSet::Ruler),
            _ => Err(format!("Unknown photo type: {}. Use main or ruler", s)),
        }
    }
}

impl std::fmt::Display for PhotoSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 撮影済み写真
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// 画像リソースのURI（カメラアダプタが返す値）
    pub uri: String,
    /// 撮影時刻（シリアライズ時はUNIXミリ秒）
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl PhotoRecord {
    /// 現在時刻で記録を作成
    pub fn new(uri: impl Into<String>) -> Self {
        Self::captured_at(uri, Utc::now())
    }

    pub fn captured_at(uri: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            uri: uri.into(),
            timestamp,
        }
    }
}
