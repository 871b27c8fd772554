//! 画面フロー（状態機械）
//!
//! NameEntry → ServiceSelection → ServiceConfirmation → PhotoCapture(main)
//! → PhotoReview(main) → [PhotoCapture(ruler) → PhotoReview(ruler)]
//! → ServiceSelection … → JobComplete
//!
//! 現在のルートと操作から次の遷移を決め、必要に応じてストアを更新する。
//! 戻る操作はどの画面でも許可され、状態を変更しない。

use crate::route::{CapturePass, Route, Screen};
use crate::store::WorkflowStore;
use crate::types::PhotoSet;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// 入力検証エラー（画面側で警告として表示する）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("crew name is empty")]
    EmptyCrewName,

    #[error("no service selected")]
    NoServiceSelected,

    #[error("service already completed: {0}")]
    ServiceAlreadyCompleted(String),

    #[error("no photos selected")]
    NoPhotosSelected,

    #[error("no photos approved")]
    NoPhotosApproved,

    #[error("photo set is not complete yet ({taken}/{required})")]
    PhotoSetIncomplete { taken: usize, required: usize },

    #[error("required services are not completed")]
    RequiredServicesIncomplete,
}

impl ValidationError {
    /// 警告ダイアログの見出し
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::EmptyCrewName => "Name Required",
            ValidationError::NoServiceSelected => "No Service Selected",
            ValidationError::ServiceAlreadyCompleted(_) => "Service Completed",
            ValidationError::NoPhotosSelected => "No Photos Selected",
            ValidationError::NoPhotosApproved => "No Photos Approved",
            ValidationError::PhotoSetIncomplete { .. } => "Photos Missing",
            ValidationError::RequiredServicesIncomplete => "Job Not Complete",
        }
    }

    /// 警告ダイアログの本文
    pub fn message(&self) -> String {
        match self {
            ValidationError::EmptyCrewName => "Please enter the crew member name.".into(),
            ValidationError::NoServiceSelected => "Please select a service.".into(),
            ValidationError::ServiceAlreadyCompleted(id) => {
                format!("{} has already been completed.", id)
            }
            ValidationError::NoPhotosSelected => "Please select photos to remove.".into(),
            ValidationError::NoPhotosApproved => {
                "Please mark at least one photo as good.".into()
            }
            ValidationError::PhotoSetIncomplete { taken, required } => {
                format!("Capture {} more photo(s) first.", required.saturating_sub(*taken))
            }
            ValidationError::RequiredServicesIncomplete => {
                "All required services must be completed first.".into()
            }
        }
    }
}

/// フローエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("action `{action}` is not available on {screen}")]
    InvalidAction { screen: Screen, action: &'static str },

    #[error("{screen} does not match the workflow state: {reason}")]
    RouteMismatch { screen: Screen, reason: String },
}

/// レビュー画面での写真選択（トグル）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSelection {
    len: usize,
    selected: BTreeSet<usize>,
}

impl ReviewSelection {
    /// `len` 枚の写真に対する空の選択
    pub fn new(len: usize) -> Self {
        Self {
            len,
            selected: BTreeSet::new(),
        }
    }

    /// 全選択
    pub fn all(len: usize) -> Self {
        Self {
            len,
            selected: (0..len).collect(),
        }
    }

    /// 範囲外のインデックスは無視する
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut selection = Self::new(len);
        for index in indices {
            selection.toggle(index);
        }
        selection
    }

    /// 選択を反転。範囲外ならfalse
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        true
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

/// 画面での操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// 作業者名を確定（NameEntry）
    SubmitName(String),
    /// サービスを選んで次へ（ServiceSelection）
    ChooseService(Option<String>),
    /// ジョブ完了を要求（ServiceSelection）
    RequestJobComplete,
    /// 撮影開始（ServiceConfirmation）
    Confirm,
    /// 1枚撮影した（PhotoCapture）
    Captured(String),
    /// 撮影済みのセットをレビューへ（PhotoCapture）
    OpenReview,
    /// 選択した写真を削除して撮り直す（PhotoReview）
    RemoveSelected(ReviewSelection),
    /// このセットを破棄して撮り直す（PhotoReview）
    Discard,
    /// 選択した写真を承認（PhotoReview）
    Approve(ReviewSelection),
    /// 完了を受け入れて全状態をリセット（JobComplete）
    AcceptJobComplete,
    /// 前の画面へ戻る（全画面）
    Back,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SubmitName(_) => "submit-name",
            Action::ChooseService(_) => "choose-service",
            Action::RequestJobComplete => "request-job-complete",
            Action::Confirm => "confirm",
            Action::Captured(_) => "captured",
            Action::OpenReview => "open-review",
            Action::RemoveSelected(_) => "remove-selected",
            Action::Discard => "discard",
            Action::Approve(_) => "approve",
            Action::AcceptJobComplete => "accept-job-complete",
            Action::Back => "back",
        }
    }
}

/// ナビゲーションへの指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// 同じ画面に留まる
    Stay,
    Push(Route),
    Replace(Route),
    Back,
    /// 指定画面までスタックを戻す。無ければスタックをこのルートで置き換える
    PopTo(Route),
    /// スタックを空にしてこのルートから始める
    Reset(Route),
}

/// ストアを借用して遷移を適用する
pub struct Flow<'s> {
    store: &'s mut WorkflowStore,
}

impl<'s> Flow<'s> {
    pub fn new(store: &'s mut WorkflowStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WorkflowStore {
        &*self.store
    }

    /// 現在の画面で操作を処理し、次の遷移を返す
    pub fn apply(&mut self, route: &Route, action: Action) -> Result<Navigation, FlowError> {
        debug!(screen = %route.screen(), action = action.name(), "flow action");

        if action == Action::Back {
            return Ok(Navigation::Back);
        }
        check_route(&*self.store, route)?;

        match (route, action) {
            (Route::NameEntry, Action::SubmitName(name)) => self.submit_name(&name),

            (Route::ServiceSelection { crew_name }, Action::ChooseService(choice)) => {
                self.choose_service(crew_name, choice)
            }
            (Route::ServiceSelection { crew_name }, Action::RequestJobComplete) => {
                if !self.store.all_required_completed() {
                    return Err(ValidationError::RequiredServicesIncomplete.into());
                }
                Ok(Navigation::Push(Route::JobComplete {
                    crew_name: crew_name.clone(),
                }))
            }

            (Route::ServiceConfirmation { service_id, .. }, Action::Confirm) => {
                self.start_capture(service_id)
            }

            (Route::PhotoCapture(pass), Action::Captured(uri)) => self.record_capture(pass, uri),
            (Route::PhotoCapture(pass), Action::OpenReview) => {
                let taken = self.store.photo_set(&pass.service_id, pass.set).len();
                if taken < pass.required_count() {
                    return Err(ValidationError::PhotoSetIncomplete {
                        taken,
                        required: pass.required_count(),
                    }
                    .into());
                }
                Ok(Navigation::Push(self.review_route(pass)))
            }

            (Route::PhotoReview { pass, .. }, Action::RemoveSelected(selection)) => {
                if selection.is_empty() {
                    return Err(ValidationError::NoPhotosSelected.into());
                }
                Ok(self.retake(pass))
            }
            (Route::PhotoReview { pass, .. }, Action::Discard) => Ok(self.retake(pass)),
            (Route::PhotoReview { pass, .. }, Action::Approve(selection)) => {
                if selection.is_empty() {
                    return Err(ValidationError::NoPhotosApproved.into());
                }
                Ok(self.approve(pass))
            }

            (Route::JobComplete { .. }, Action::AcceptJobComplete) => {
                self.store.reset_app();
                Ok(Navigation::Reset(Route::NameEntry))
            }

            (route, action) => Err(FlowError::InvalidAction {
                screen: route.screen(),
                action: action.name(),
            }),
        }
    }

    fn submit_name(&mut self, name: &str) -> Result<Navigation, FlowError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCrewName.into());
        }
        self.store.set_crew_name(name);
        Ok(Navigation::Push(Route::ServiceSelection {
            crew_name: name.to_string(),
        }))
    }

    fn choose_service(
        &mut self,
        crew_name: &str,
        choice: Option<String>,
    ) -> Result<Navigation, FlowError> {
        let service_id = choice
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::NoServiceSelected)?;
        if !self.store.catalog().contains(&service_id) {
            return Err(FlowError::UnknownService(service_id));
        }
        if self.store.is_service_completed(&service_id) {
            return Err(ValidationError::ServiceAlreadyCompleted(service_id).into());
        }
        Ok(Navigation::Push(Route::ServiceConfirmation {
            crew_name: crew_name.to_string(),
            service_id,
        }))
    }

    /// 古い写真を消し、ルーラー要否をカタログから確定して撮影へ
    fn start_capture(&mut self, service_id: &str) -> Result<Navigation, FlowError> {
        let ruler_photos = self
            .store
            .catalog()
            .get(service_id)
            .map(|s| s.ruler_photos)
            .ok_or_else(|| FlowError::UnknownService(service_id.to_string()))?;

        self.store.clear_service_photos(service_id);
        Ok(Navigation::Push(Route::PhotoCapture(CapturePass::start(
            service_id,
            ruler_photos,
        ))))
    }

    fn record_capture(&mut self, pass: &CapturePass, uri: String) -> Result<Navigation, FlowError> {
        let required = pass.required_count();
        if self.store.photo_set(&pass.service_id, pass.set).len() >= required {
            return Err(FlowError::InvalidAction {
                screen: Screen::PhotoCapture,
                action: "captured",
            });
        }

        self.store.add_photo(&pass.service_id, uri);
        let taken = self.store.photo_set(&pass.service_id, pass.set).len();
        if taken >= required {
            Ok(Navigation::Push(self.review_route(pass)))
        } else {
            Ok(Navigation::Stay)
        }
    }

    fn retake(&mut self, pass: &CapturePass) -> Navigation {
        self.store.discard_photo_set(&pass.service_id, pass.set);
        Navigation::Replace(Route::PhotoCapture(pass.clone()))
    }

    fn approve(&mut self, pass: &CapturePass) -> Navigation {
        if let Some(next) = pass.next_set() {
            return Navigation::Push(Route::PhotoCapture(pass.with_set(next)));
        }

        self.store.mark_service_completed(&pass.service_id);
        Navigation::PopTo(Route::ServiceSelection {
            crew_name: self.store.crew_name().to_string(),
        })
    }

    fn review_route(&self, pass: &CapturePass) -> Route {
        let photos = self
            .store
            .photo_set(&pass.service_id, pass.set)
            .iter()
            .map(|p| p.uri.clone())
            .collect();
        Route::PhotoReview {
            pass: pass.clone(),
            photos,
        }
    }
}

/// 型付きルートがストアの内容と矛盾しないか
///
/// ルートは書式とカタログについては検証済みでも、ストアより古い（または外部から
/// 積まれた）可能性がある。撮影・レビュー・完了の各画面はストアを正とする。
pub fn check_route(store: &WorkflowStore, route: &Route) -> Result<(), FlowError> {
    let mismatch = |reason: String| FlowError::RouteMismatch {
        screen: route.screen(),
        reason,
    };

    match route {
        Route::ServiceConfirmation { service_id, .. } => {
            if store.is_service_completed(service_id) {
                return Err(mismatch(format!("{} is already completed", service_id)));
            }
        }
        Route::PhotoCapture(pass) => check_pass(store, pass).map_err(mismatch)?,
        Route::PhotoReview { pass, photos } => {
            check_pass(store, pass).map_err(mismatch)?;
            let stored = store.photo_set(&pass.service_id, pass.set);
            if stored.len() < pass.required_count() {
                return Err(mismatch(format!(
                    "{} has {}/{} photos",
                    pass.set,
                    stored.len(),
                    pass.required_count()
                )));
            }
            if !stored.iter().map(|p| p.uri.as_str()).eq(photos.iter().map(String::as_str)) {
                return Err(mismatch(format!("{} photos differ from the captured set", pass.set)));
            }
        }
        Route::JobComplete { .. } => {
            if !store.all_required_completed() {
                return Err(mismatch("required services are not completed".into()));
            }
        }
        Route::NameEntry | Route::ServiceSelection { .. } => {}
    }
    Ok(())
}

fn check_pass(store: &WorkflowStore, pass: &CapturePass) -> Result<(), String> {
    if store.is_service_completed(&pass.service_id) {
        return Err(format!("{} is already completed", pass.service_id));
    }
    let ruler_photos = store
        .catalog()
        .get(&pass.service_id)
        .map(|s| s.ruler_photos)
        .unwrap_or(false);
    if pass.ruler_photos != ruler_photos {
        return Err(format!("ruler flag does not match {}", pass.service_id));
    }
    // ルーラー写真はメイン写真の後ろにしか置けない
    if pass.set == PhotoSet::Ruler && !set_is_full(store, &pass.service_id, PhotoSet::Main) {
        return Err("main photos are not complete".into());
    }
    Ok(())
}

/// 写真セットの撮影枚数が揃っているか
pub fn set_is_full(store: &WorkflowStore, service_id: &str, set: PhotoSet) -> bool {
    store.photo_set(service_id, set).len() >= set.required_count()
}
