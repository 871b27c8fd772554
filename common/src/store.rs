//! ワークフロー状態ストア
//!
//! セッション単位の進捗（作業者名・完了サービス・サービスごとの写真列）を保持する。
//! 各画面には `&mut WorkflowStore` として渡され、暗黙のグローバル状態は持たない。
//!
//! 操作はすべて同期的で失敗しない。カタログにないサービスIDへの変更は
//! 警告ログを出して無視し、照会は空・falseを返す。

use crate::catalog::{Service, ServiceCatalog};
use crate::types::{PhotoRecord, PhotoSet};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct WorkflowStore {
    catalog: ServiceCatalog,
    crew_name: String,
    completed_services: HashSet<String>,
    service_photos: HashMap<String, Vec<PhotoRecord>>,
}

impl WorkflowStore {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self {
            catalog,
            crew_name: String::new(),
            completed_services: HashSet::new(),
            service_photos: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn crew_name(&self) -> &str {
        &self.crew_name
    }

    /// 作業者名を置き換える（空チェックは呼び出し側）
    pub fn set_crew_name(&mut self, name: impl Into<String>) {
        self.crew_name = name.into();
        debug!(crew_name = %self.crew_name, "crew name set");
    }

    /// サービスを完了済みにする（冪等）
    pub fn mark_service_completed(&mut self, service_id: &str) {
        if !self.known(service_id, "mark_service_completed") {
            return;
        }
        if self.completed_services.insert(service_id.to_string()) {
            debug!(service_id, "service completed");
        }
    }

    pub fn is_service_completed(&self, service_id: &str) -> bool {
        self.completed_services.contains(service_id)
    }

    pub fn completed_services(&self) -> &HashSet<String> {
        &self.completed_services
    }

    pub fn completed_count(&self) -> usize {
        self.completed_services.len()
    }

    /// 必須サービスがすべて完了しているか（必須が無ければtrue）
    pub fn all_required_completed(&self) -> bool {
        self.catalog
            .required()
            .all(|s| self.completed_services.contains(&s.id))
    }

    /// 写真を末尾に追加（件数の上限は画面側で管理）
    pub fn add_photo(&mut self, service_id: &str, uri: impl Into<String>) {
        if !self.known(service_id, "add_photo") {
            return;
        }
        let photos = self.service_photos.entry(service_id.to_string()).or_default();
        photos.push(PhotoRecord::new(uri));
        debug!(service_id, count = photos.len(), "photo added");
    }

    /// サービスの写真列（未登録なら空）
    pub fn get_service_photos(&self, service_id: &str) -> &[PhotoRecord] {
        self.service_photos
            .get(service_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 写真列のうち指定セットの範囲
    pub fn photo_set(&self, service_id: &str, set: PhotoSet) -> &[PhotoRecord] {
        let photos = self.get_service_photos(service_id);
        let start = set.offset().min(photos.len());
        let end = set.range().end.min(photos.len());
        &photos[start..end]
    }

    /// サービスの写真列をすべて削除
    pub fn clear_service_photos(&mut self, service_id: &str) {
        if self.service_photos.remove(service_id).is_some() {
            debug!(service_id, "photos cleared");
        }
    }

    /// 指定セット以降の写真を削除する
    ///
    /// ルーラー写真の撮り直しでは承認済みのメイン写真を残す。
    pub fn discard_photo_set(&mut self, service_id: &str, set: PhotoSet) {
        if set.offset() == 0 {
            self.clear_service_photos(service_id);
            return;
        }
        if let Some(photos) = self.service_photos.get_mut(service_id) {
            photos.truncate(set.offset());
            debug!(service_id, set = %set, remaining = photos.len(), "photo set discarded");
        }
    }

    /// 全状態を初期化（ジョブ完了後）
    pub fn reset_app(&mut self) {
        self.crew_name.clear();
        self.completed_services.clear();
        self.service_photos.clear();
        debug!("workflow state reset");
    }

    /// 完了サービスの集計（カタログ順）
    pub fn summary(&self) -> JobSummary {
        let services = self
            .catalog
            .services()
            .iter()
            .filter(|s| self.is_service_completed(&s.id))
            .map(|s| self.service_summary(s))
            .collect();

        JobSummary {
            crew_name: self.crew_name.clone(),
            services,
        }
    }

    fn service_summary(&self, service: &Service) -> ServiceSummary {
        ServiceSummary {
            id: service.id.clone(),
            name: service.name.clone(),
            main_photos: self.photo_set(&service.id, PhotoSet::Main).len(),
            ruler_photos: self.photo_set(&service.id, PhotoSet::Ruler).len(),
        }
    }

    fn known(&self, service_id: &str, operation: &'static str) -> bool {
        let known = self.catalog.contains(service_id);
        if !known {
            warn!(service_id, operation, "unknown service id ignored");
        }
        known
    }
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new(ServiceCatalog::builtin())
    }
}

/// ジョブ完了時の集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub crew_name: String,
    pub services: Vec<ServiceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub main_photos: usize,
    pub ruler_photos: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uris(records: &[PhotoRecord]) -> Vec<&str> {
        records.iter().map(|r| r.uri.as_str()).collect()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = WorkflowStore::default();
        assert_eq!(store.crew_name(), "");
        assert_eq!(store.completed_count(), 0);
        assert!(store.get_service_photos("air-seal").is_empty());
        assert!(!store.all_required_completed());
    }

    #[test]
    fn test_mark_unknown_service_is_ignored() {
        let mut store = WorkflowStore::default();
        store.mark_service_completed("roof-vent");
        assert!(!store.is_service_completed("roof-vent"));
        assert_eq!(store.completed_count(), 0);
    }

    #[test]
    fn test_add_photo_unknown_service_is_ignored() {
        let mut store = WorkflowStore::default();
        store.add_photo("roof-vent", "file:///a.jpg");
        assert!(store.get_service_photos("roof-vent").is_empty());
    }

    #[test]
    fn test_photo_set_partitions() {
        let mut store = WorkflowStore::default();
        for i in 0..7 {
            store.add_photo("attic-section", format!("p{}", i));
        }

        assert_eq!(
            uris(store.photo_set("attic-section", PhotoSet::Main)),
            vec!["p0", "p1", "p2", "p3", "p4"]
        );
        assert_eq!(uris(store.photo_set("attic-section", PhotoSet::Ruler)), vec!["p5", "p6"]);
    }

    #[test]
    fn test_photo_set_partial_main() {
        let mut store = WorkflowStore::default();
        store.add_photo("air-seal", "p0");
        store.add_photo("air-seal", "p1");

        assert_eq!(store.photo_set("air-seal", PhotoSet::Main).len(), 2);
        assert!(store.photo_set("air-seal", PhotoSet::Ruler).is_empty());
    }

    #[test]
    fn test_discard_ruler_keeps_main() {
        let mut store = WorkflowStore::default();
        for i in 0..8 {
            store.add_photo("wall-section", format!("p{}", i));
        }

        store.discard_photo_set("wall-section", PhotoSet::Ruler);
        assert_eq!(store.get_service_photos("wall-section").len(), 5);
        assert!(store.photo_set("wall-section", PhotoSet::Ruler).is_empty());

        store.discard_photo_set("wall-section", PhotoSet::Main);
        assert!(store.get_service_photos("wall-section").is_empty());
    }

    #[test]
    fn test_summary_lists_completed_in_catalog_order() {
        let mut store = WorkflowStore::default();
        store.set_crew_name("Alex");
        store.mark_service_completed("attic-section");
        store.mark_service_completed("air-seal");
        for i in 0..8 {
            store.add_photo("attic-section", format!("p{}", i));
        }

        let summary = store.summary();
        assert_eq!(summary.crew_name, "Alex");
        let ids: Vec<&str> = summary.services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["air-seal", "attic-section"]);
        assert_eq!(summary.services[1].main_photos, 5);
        assert_eq!(summary.services[1].ruler_photos, 3);

        let json = serde_json::to_string(&summary).expect("シリアライズ失敗");
        assert!(json.contains("\"crewName\":\"Alex\""));
        assert!(json.contains("\"rulerPhotos\":3"));
    }

    #[test]
    fn test_required_subset_empty_is_vacuously_true() {
        let catalog = ServiceCatalog::from_json(r#"[{"id": "soffit", "name": "Soffit"}]"#).unwrap();
        let store = WorkflowStore::new(catalog);
        assert!(store.all_required_completed());
    }
}
