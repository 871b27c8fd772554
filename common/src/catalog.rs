//! サービスカタログ
//!
//! 現場で記録対象となる作業サービスの一覧。セッション中は変更されない。
//! 組み込みカタログの他、JSONファイルから読み込んだカタログも使える。

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 作業サービス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// 識別子（`air-seal` 形式）
    pub id: String,
    /// 表示名
    pub name: String,
    /// 完了必須か
    #[serde(default)]
    pub required: bool,
    /// メイン写真の後にルーラー写真セットが必要か
    #[serde(default)]
    pub ruler_photos: bool,
}

impl Service {
    pub fn new(id: &str, name: &str, required: bool, ruler_photos: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            required,
            ruler_photos,
        }
    }
}

/// サービスカタログ（カタログ順を保持）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: Vec<Service>,
}

impl ServiceCatalog {
    /// 組み込みカタログ
    ///
    /// 断熱材の厚みを確認する「〜Section」系のみルーラー写真が必要。
    pub fn builtin() -> Self {
        Self {
            services: vec![
                Service::new("air-seal", "Air Seal", true, false),
                Service::new("alarm-photo", "Alarm Photo", true, false),
                Service::new("attic-section", "Attic Section", false, true),
                Service::new("crawlspace-section", "Crawlspace Section", false, true),
                Service::new("wall-section", "Wall Section", false, true),
                Service::new("duct-mastic", "Duct Mastic", false, false),
                Service::new("duct-sealing", "Duct Sealing", false, false),
            ],
        }
    }

    /// 検証付きでカタログを作成
    pub fn new(services: Vec<Service>) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::Catalog("catalog has no services".into()));
        }

        let mut seen = HashSet::new();
        for service in &services {
            if !is_service_id(&service.id) {
                return Err(Error::Catalog(format!(
                    "invalid service id: {:?} (expected lowercase words joined by '-')",
                    service.id
                )));
            }
            if service.name.trim().is_empty() {
                return Err(Error::Catalog(format!("service {} has no name", service.id)));
            }
            if !seen.insert(service.id.as_str()) {
                return Err(Error::Catalog(format!("duplicate service id: {}", service.id)));
            }
        }

        Ok(Self { services })
    }

    /// JSON文字列（サービスの配列）から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let services: Vec<Service> = serde_json::from_str(json)?;
        Self::new(services)
    }

    /// JSONファイルから読み込み（非WASM環境のみ）
    #[cfg(not(feature = "wasm"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// 必須サービス
    pub fn required(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|s| s.required)
    }

    /// 任意サービス
    pub fn optional(&self) -> impl Iterator<Item = &Service> {
        self.services.iter().filter(|s| !s.required)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// サービスIDの書式チェック
fn is_service_id(id: &str) -> bool {
    lazy_static::lazy_static! {
        static ref SERVICE_ID_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    }
    SERVICE_ID_RE.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ServiceCatalog::builtin();
        assert_eq!(catalog.len(), 7);

        let required: Vec<&str> = catalog.required().map(|s| s.id.as_str()).collect();
        assert_eq!(required, vec!["air-seal", "alarm-photo"]);
        assert_eq!(catalog.optional().count(), 5);
    }

    #[test]
    fn test_builtin_ruler_policy() {
        let catalog = ServiceCatalog::builtin();
        assert!(catalog.get("attic-section").unwrap().ruler_photos);
        assert!(!catalog.get("air-seal").unwrap().ruler_photos);
        assert!(!catalog.get("duct-sealing").unwrap().ruler_photos);
    }

    #[test]
    fn test_get_unknown() {
        let catalog = ServiceCatalog::builtin();
        assert!(catalog.get("air_seal").is_none());
        assert!(!catalog.contains("roof-vent"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "roof-vent", "name": "Roof Vent", "required": true},
            {"id": "soffit", "name": "Soffit", "rulerPhotos": true}
        ]"#;

        let catalog = ServiceCatalog::from_json(json).expect("カタログ読み込み失敗");
        assert_eq!(catalog.len(), 2);

        let soffit = catalog.get("soffit").unwrap();
        assert!(!soffit.required); // デフォルト値
        assert!(soffit.ruler_photos);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "air-seal", "name": "Air Seal"},
            {"id": "air-seal", "name": "Air Seal 2"}
        ]"#;
        let err = ServiceCatalog::from_json(json).unwrap_err();
        assert!(format!("{}", err).contains("duplicate"));
    }

    #[test]
    fn test_rejects_malformed_ids() {
        for id in ["air_seal", "Air-Seal", "", "-air", "air--seal"] {
            let services = vec![Service::new(id, "X", false, false)];
            assert!(ServiceCatalog::new(services).is_err(), "受理されてしまった: {:?}", id);
        }
    }

    #[test]
    fn test_rejects_empty_catalog_and_name() {
        assert!(ServiceCatalog::new(Vec::new()).is_err());
        assert!(ServiceCatalog::new(vec![Service::new("a", "  ", false, false)]).is_err());
    }

    #[test]
    fn test_serialize_roundtrip_via_json() {
        let catalog = ServiceCatalog::builtin();
        let json = serde_json::to_string(&catalog).expect("シリアライズ失敗");
        assert!(json.starts_with('['));
        assert!(json.contains("\"rulerPhotos\":true"));

        let restored = ServiceCatalog::from_json(&json).expect("再読み込み失敗");
        assert_eq!(restored, catalog);
    }
}
