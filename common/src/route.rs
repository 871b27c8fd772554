//! 画面遷移の型付きルート
//!
//! ナビゲーションスタックを越えるパラメータは文字列のみの `ParamBag` に
//! シリアライズされる。受け側の画面は `Route::decode` で型付きルートに戻し、
//! 欠落・不正なパラメータやカタログにないサービスIDはここで弾く。
//!
//! | 画面 | パス | パラメータ |
//! |------|------|------------|
//! | NameEntry | `/` | なし |
//! | ServiceSelection | `/job-entry` | crewName |
//! | ServiceConfirmation | `/service-confirmation` | crewName, serviceId |
//! | PhotoCapture | `/photo-capture` | serviceId, photoType, rulerPhotos |
//! | PhotoReview | `/photo-review` | serviceId, photoType, rulerPhotos, photos |
//! | JobComplete | `/job-complete` | crewName |

use crate::catalog::ServiceCatalog;
use crate::types::PhotoSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const CREW_NAME: &str = "crewName";
const SERVICE_ID: &str = "serviceId";
const PHOTO_TYPE: &str = "photoType";
const RULER_PHOTOS: &str = "rulerPhotos";
const PHOTOS: &str = "photos";

/// ルート復元エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown screen: {0}")]
    UnknownScreen(String),

    #[error("missing parameter `{0}`")]
    MissingParam(&'static str),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error("unknown service: {0}")]
    UnknownService(String),
}

/// 画面の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    NameEntry,
    ServiceSelection,
    ServiceConfirmation,
    PhotoCapture,
    PhotoReview,
    JobComplete,
}

impl Screen {
    pub fn path(self) -> &'static str {
        match self {
            Screen::NameEntry => "/",
            Screen::ServiceSelection => "/job-entry",
            Screen::ServiceConfirmation => "/service-confirmation",
            Screen::PhotoCapture => "/photo-capture",
            Screen::PhotoReview => "/photo-review",
            Screen::JobComplete => "/job-complete",
        }
    }

    pub fn from_path(path: &str) -> Result<Self, RouteError> {
        match path {
            "/" => Ok(Screen::NameEntry),
            "/job-entry" => Ok(Screen::ServiceSelection),
            "/service-confirmation" => Ok(Screen::ServiceConfirmation),
            "/photo-capture" => Ok(Screen::PhotoCapture),
            "/photo-review" => Ok(Screen::PhotoReview),
            "/job-complete" => Ok(Screen::JobComplete),
            _ => Err(RouteError::UnknownScreen(path.to_string())),
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// 文字列のみのパラメータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamBag(BTreeMap<String, String>);

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    fn require(&self, key: &'static str) -> Result<&str, RouteError> {
        self.get(key).ok_or(RouteError::MissingParam(key))
    }

    fn require_text(&self, key: &'static str) -> Result<String, RouteError> {
        let value = self.require(key)?.trim();
        if value.is_empty() {
            return Err(RouteError::InvalidParam {
                name: key,
                reason: "empty value".into(),
            });
        }
        Ok(value.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 撮影パス: 対象サービスと撮影中の写真セット
///
/// ルーラー要否は確認画面でカタログから一度だけ決まり、以降はここで持ち回る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePass {
    pub service_id: String,
    pub set: PhotoSet,
    pub ruler_photos: bool,
}

impl CapturePass {
    /// メイン写真から開始するパス
    pub fn start(service_id: impl Into<String>, ruler_photos: bool) -> Self {
        Self {
            service_id: service_id.into(),
            set: PhotoSet::Main,
            ruler_photos,
        }
    }

    pub fn required_count(&self) -> usize {
        self.set.required_count()
    }

    /// 現在のセットを承認した後に撮るセット
    pub fn next_set(&self) -> Option<PhotoSet> {
        match self.set {
            PhotoSet::Main if self.ruler_photos => Some(PhotoSet::Ruler),
            _ => None,
        }
    }

    pub fn with_set(&self, set: PhotoSet) -> Self {
        Self {
            set,
            ..self.clone()
        }
    }

    fn write(&self, params: &mut ParamBag) {
        params.insert(SERVICE_ID, self.service_id.clone());
        params.insert(PHOTO_TYPE, self.set.as_str());
        params.insert(RULER_PHOTOS, self.ruler_photos.to_string());
    }

    fn read(params: &ParamBag) -> Result<Self, RouteError> {
        let service_id = params.require_text(SERVICE_ID)?;
        let set = params
            .require(PHOTO_TYPE)?
            .parse::<PhotoSet>()
            .map_err(|reason| RouteError::InvalidParam { name: PHOTO_TYPE, reason })?;
        let ruler_photos = params
            .require(RULER_PHOTOS)?
            .parse::<bool>()
            .map_err(|e| RouteError::InvalidParam {
                name: RULER_PHOTOS,
                reason: e.to_string(),
            })?;

        if set == PhotoSet::Ruler && !ruler_photos {
            return Err(RouteError::InvalidParam {
                name: PHOTO_TYPE,
                reason: "ruler photos requested for a service without a ruler set".into(),
            });
        }

        Ok(Self {
            service_id,
            set,
            ruler_photos,
        })
    }
}

/// 画面ごとの型付きルート
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    NameEntry,
    ServiceSelection { crew_name: String },
    ServiceConfirmation { crew_name: String, service_id: String },
    PhotoCapture(CapturePass),
    PhotoReview { pass: CapturePass, photos: Vec<String> },
    JobComplete { crew_name: String },
}

impl Route {
    pub fn screen(&self) -> Screen {
        match self {
            Route::NameEntry => Screen::NameEntry,
            Route::ServiceSelection { .. } => Screen::ServiceSelection,
            Route::ServiceConfirmation { .. } => Screen::ServiceConfirmation,
            Route::PhotoCapture(_) => Screen::PhotoCapture,
            Route::PhotoReview { .. } => Screen::PhotoReview,
            Route::JobComplete { .. } => Screen::JobComplete,
        }
    }

    /// ルートが対象とするサービス
    pub fn service_id(&self) -> Option<&str> {
        match self {
            Route::ServiceConfirmation { service_id, .. } => Some(service_id.as_str()),
            Route::PhotoCapture(pass) | Route::PhotoReview { pass, .. } => {
                Some(pass.service_id.as_str())
            }
            _ => None,
        }
    }

    /// スタックに積むためのパラメータへ変換
    pub fn to_params(&self) -> ParamBag {
        let mut params = ParamBag::new();
        match self {
            Route::NameEntry => {}
            Route::ServiceSelection { crew_name } | Route::JobComplete { crew_name } => {
                params.insert(CREW_NAME, crew_name.clone());
            }
            Route::ServiceConfirmation { crew_name, service_id } => {
                params.insert(CREW_NAME, crew_name.clone());
                params.insert(SERVICE_ID, service_id.clone());
            }
            Route::PhotoCapture(pass) => pass.write(&mut params),
            Route::PhotoReview { pass, photos } => {
                pass.write(&mut params);
                // Vec<String> のシリアライズは失敗しない
                let encoded = serde_json::to_string(photos).unwrap_or_else(|_| "[]".into());
                params.insert(PHOTOS, encoded);
            }
        }
        params
    }

    /// パラメータから型付きルートを復元（書式のみ検証）
    pub fn from_params(screen: Screen, params: &ParamBag) -> Result<Self, RouteError> {
        let route = match screen {
            Screen::NameEntry => Route::NameEntry,
            Screen::ServiceSelection => Route::ServiceSelection {
                crew_name: params.require_text(CREW_NAME)?,
            },
            Screen::ServiceConfirmation => Route::ServiceConfirmation {
                crew_name: params.require_text(CREW_NAME)?,
                service_id: params.require_text(SERVICE_ID)?,
            },
            Screen::PhotoCapture => Route::PhotoCapture(CapturePass::read(params)?),
            Screen::PhotoReview => {
                let pass = CapturePass::read(params)?;
                let photos: Vec<String> = serde_json::from_str(params.require(PHOTOS)?)
                    .map_err(|e| RouteError::InvalidParam {
                        name: PHOTOS,
                        reason: e.to_string(),
                    })?;
                if photos.is_empty() || photos.len() > pass.required_count() {
                    return Err(RouteError::InvalidParam {
                        name: PHOTOS,
                        reason: format!(
                            "expected 1..={} photos, got {}",
                            pass.required_count(),
                            photos.len()
                        ),
                    });
                }
                Route::PhotoReview { pass, photos }
            }
            Screen::JobComplete => Route::JobComplete {
                crew_name: params.require_text(CREW_NAME)?,
            },
        };
        Ok(route)
    }

    /// 画面の入口での検証: 書式に加えてサービスIDがカタログにあること
    pub fn decode(
        screen: Screen,
        params: &ParamBag,
        catalog: &ServiceCatalog,
    ) -> Result<Self, RouteError> {
        let route = Self::from_params(screen, params)?;
        if let Some(service_id) = route.service_id() {
            if !catalog.contains(service_id) {
                return Err(RouteError::UnknownService(service_id.to_string()));
            }
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_route() -> Route {
        Route::PhotoReview {
            pass: CapturePass::start("attic-section", true),
            photos: vec!["file:///1.jpg".into(), "file:///2.jpg".into()],
        }
    }

    #[test]
    fn test_screen_paths() {
        for screen in [
            Screen::NameEntry,
            Screen::ServiceSelection,
            Screen::ServiceConfirmation,
            Screen::PhotoCapture,
            Screen::PhotoReview,
            Screen::JobComplete,
        ] {
            assert_eq!(Screen::from_path(screen.path()), Ok(screen));
        }
        assert!(matches!(
            Screen::from_path("/settings"),
            Err(RouteError::UnknownScreen(_))
        ));
    }

    #[test]
    fn test_capture_params_are_plain_strings() {
        let route = Route::PhotoCapture(CapturePass::start("air-seal", false));
        let params = route.to_params();

        assert_eq!(params.get("serviceId"), Some("air-seal"));
        assert_eq!(params.get("photoType"), Some("main"));
        assert_eq!(params.get("rulerPhotos"), Some("false"));
        assert_eq!(params.len(), 3);
        assert!(Route::NameEntry.to_params().is_empty());
    }

    #[test]
    fn test_review_photos_json_encoded() {
        let params = review_route().to_params();
        assert_eq!(params.get("photos"), Some(r#"["file:///1.jpg","file:///2.jpg"]"#));

        let decoded = Route::from_params(Screen::PhotoReview, &params).expect("復元失敗");
        assert_eq!(decoded, review_route());
    }

    #[test]
    fn test_missing_param() {
        let mut params = Route::ServiceSelection { crew_name: "Alex".into() }.to_params();
        params.remove("crewName");
        assert_eq!(
            Route::from_params(Screen::ServiceSelection, &params),
            Err(RouteError::MissingParam("crewName"))
        );
    }

    #[test]
    fn test_blank_crew_name_rejected() {
        let params = Route::JobComplete { crew_name: "   ".into() }.to_params();
        assert!(matches!(
            Route::from_params(Screen::JobComplete, &params),
            Err(RouteError::InvalidParam { name: "crewName", .. })
        ));
    }

    #[test]
    fn test_malformed_photo_type() {
        let mut params = Route::PhotoCapture(CapturePass::start("air-seal", false)).to_params();
        params.insert("photoType", "tape");
        assert!(matches!(
            Route::from_params(Screen::PhotoCapture, &params),
            Err(RouteError::InvalidParam { name: "photoType", .. })
        ));
    }

    #[test]
    fn test_ruler_type_without_ruler_flag() {
        let pass = CapturePass::start("air-seal", false).with_set(PhotoSet::Ruler);
        let params = Route::PhotoCapture(pass).to_params();
        assert!(matches!(
            Route::from_params(Screen::PhotoCapture, &params),
            Err(RouteError::InvalidParam { name: "photoType", .. })
        ));
    }

    #[test]
    fn test_malformed_photos_json() {
        let mut params = review_route().to_params();
        params.insert("photos", "file:///1.jpg");
        assert!(matches!(
            Route::from_params(Screen::PhotoReview, &params),
            Err(RouteError::InvalidParam { name: "photos", .. })
        ));

        params.insert("photos", "[]");
        assert!(matches!(
            Route::from_params(Screen::PhotoReview, &params),
            Err(RouteError::InvalidParam { name: "photos", .. })
        ));
    }

    #[test]
    fn test_decode_unknown_service() {
        let catalog = ServiceCatalog::builtin();
        let params = Route::ServiceConfirmation {
            crew_name: "Alex".into(),
            service_id: "air_seal".into(),
        }
        .to_params();

        assert_eq!(
            Route::decode(Screen::ServiceConfirmation, &params, &catalog),
            Err(RouteError::UnknownService("air_seal".into()))
        );
    }

    #[test]
    fn test_next_set() {
        let attic = CapturePass::start("attic-section", true);
        assert_eq!(attic.next_set(), Some(PhotoSet::Ruler));
        assert_eq!(attic.with_set(PhotoSet::Ruler).next_set(), None);
        assert_eq!(CapturePass::start("air-seal", false).next_set(), None);
    }
}
