//! 画面
//!
//! 各画面は型付きルートとストアの読み取りビューから表示内容を作り、
//! 作業者の入力をフローの `Action` に変換する。ストアの変更はフロー側で行う。

use crate::camera::{CaptureError, PhotoCapture};
use crate::error::Result;
use crate::operator::{
    BoardEntry, CaptureProgress, Operator, ReviewChoice, ReviewSheet, ServiceBoard, ServiceChoice,
};
use crew_photo_common::flow::set_is_full;
use crew_photo_common::{Action, CapturePass, Route, Service, WorkflowStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// 画面をまたいで保持するホスト側の状態
#[derive(Debug, Default)]
pub struct HostState {
    /// 一度許可されたカメラはセッション中再要求しない
    pub camera_permitted: bool,
    pub capture: CaptureWatch,
}

/// 撮影待ちの有無
///
/// Ctrl-C はセッションの監視タスクと撮影画面の両方に届く。撮影待ちの間だけ
/// 撮影画面が取り消しとして扱い、それ以外は監視タスクがプロセスを終了する。
#[derive(Debug, Clone, Default)]
pub struct CaptureWatch(Arc<AtomicBool>);

impl CaptureWatch {
    pub fn in_flight(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// スコープを抜けるまで撮影待ちにする
    fn begin(&self) -> CaptureScope {
        self.0.store(true, Ordering::SeqCst);
        CaptureScope(self.0.clone())
    }
}

struct CaptureScope(Arc<AtomicBool>);

impl Drop for CaptureScope {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// ルートに対応する画面を表示し、作業者の操作を返す
pub async fn present<O, C>(
    route: &Route,
    store: &WorkflowStore,
    operator: &mut O,
    camera: &mut C,
    host: &mut HostState,
) -> Result<Action>
where
    O: Operator,
    C: PhotoCapture,
{
    match route {
        Route::NameEntry => name_entry(operator),
        Route::ServiceSelection { crew_name } => service_selection(crew_name, store, operator),
        Route::ServiceConfirmation { service_id, .. } => {
            service_confirmation(service(store, service_id), operator)
        }
        Route::PhotoCapture(pass) => photo_capture(pass, store, operator, camera, host).await,
        Route::PhotoReview { pass, photos } => {
            photo_review(pass, photos, service(store, &pass.service_id), operator)
        }
        Route::JobComplete { .. } => job_complete(store, operator),
    }
}

/// ルートはカタログ検証済み
fn service<'a>(store: &'a WorkflowStore, service_id: &str) -> Option<&'a Service> {
    store.catalog().get(service_id)
}

fn name_entry<O: Operator>(operator: &mut O) -> Result<Action> {
    Ok(match operator.crew_name()? {
        Some(name) => Action::SubmitName(name),
        None => Action::Back,
    })
}

fn service_selection<O: Operator>(
    crew_name: &str,
    store: &WorkflowStore,
    operator: &mut O,
) -> Result<Action> {
    let catalog = store.catalog();
    // 必須サービスを先に並べる
    let entries = catalog
        .required()
        .chain(catalog.optional())
        .map(|service| BoardEntry {
            service: service.clone(),
            completed: store.is_service_completed(&service.id),
        })
        .collect();

    let board = ServiceBoard {
        crew_name: crew_name.to_string(),
        entries,
        can_finish: store.all_required_completed(),
    };

    Ok(match operator.choose_service(&board)? {
        ServiceChoice::Service(id) => Action::ChooseService(Some(id)),
        ServiceChoice::FullyComplete => Action::RequestJobComplete,
        ServiceChoice::Back => Action::Back,
    })
}

fn service_confirmation<O: Operator>(service: Option<&Service>, operator: &mut O) -> Result<Action> {
    let Some(service) = service else {
        return Ok(Action::Back);
    };
    Ok(if operator.confirm_service(service)? {
        Action::Confirm
    } else {
        Action::Back
    })
}

async fn photo_capture<O, C>(
    pass: &CapturePass,
    store: &WorkflowStore,
    operator: &mut O,
    camera: &mut C,
    host: &mut HostState,
) -> Result<Action>
where
    O: Operator,
    C: PhotoCapture,
{
    let Some(service) = service(store, &pass.service_id) else {
        return Ok(Action::Back);
    };

    // 戻ってきた時点で揃っていればそのままレビューへ
    if set_is_full(store, &pass.service_id, pass.set) {
        return Ok(Action::OpenReview);
    }

    while !host.camera_permitted {
        if camera.request_permission().await {
            host.camera_permitted = true;
        } else if !operator.grant_permission()? {
            return Ok(Action::Back);
        }
    }

    let progress = CaptureProgress {
        service_name: service.name.clone(),
        set: pass.set,
        taken: store.photo_set(&pass.service_id, pass.set).len(),
        required: pass.required_count(),
    };

    loop {
        if !operator.shutter(&progress)? {
            return Ok(Action::Back);
        }

        // Ctrl-Cで撮影待ちを取り消す（状態は変更しない）
        let result = {
            let _scope = host.capture.begin();
            tokio::select! {
                biased;
                result = camera.capture() => result,
                _ = tokio::signal::ctrl_c() => return Ok(Action::Back),
            }
        };

        match result {
            Ok(uri) => return Ok(Action::Captured(uri)),
            Err(CaptureError::PermissionDenied) => {
                warn!(service_id = %pass.service_id, "camera permission lost");
                host.camera_permitted = false;
                operator.alert("Camera Access Required", "Camera access was revoked.");
                return Ok(Action::Back);
            }
            Err(err) => {
                warn!(service_id = %pass.service_id, error = %err, "capture failed");
                operator.alert("Error", "Failed to capture photo. Please try again.");
            }
        }
    }
}

fn photo_review<O: Operator>(
    pass: &CapturePass,
    photos: &[String],
    service: Option<&Service>,
    operator: &mut O,
) -> Result<Action> {
    let Some(service) = service else {
        return Ok(Action::Back);
    };

    let sheet = ReviewSheet {
        service_name: service.name.clone(),
        set: pass.set,
        photos: photos.to_vec(),
    };

    loop {
        match operator.review(&sheet)? {
            ReviewChoice::Approve(selection) => {
                if !selection.is_empty() {
                    match pass.next_set() {
                        Some(_) => operator.alert(
                            "Main Photos Approved",
                            "Now capture the ruler photos.",
                        ),
                        None => operator.alert(
                            "Service Complete",
                            &format!("{} has been completed!", service.name),
                        ),
                    }
                }
                return Ok(Action::Approve(selection));
            }
            ReviewChoice::RemoveSelected(selection) => {
                // 未選択はフロー側の検証で警告する
                if selection.is_empty() {
                    return Ok(Action::RemoveSelected(selection));
                }
                let message = format!(
                    "Are you sure you want to remove {} photo(s) and retake?",
                    selection.count()
                );
                if operator.confirm("Remove Photos", &message)? {
                    return Ok(Action::RemoveSelected(selection));
                }
            }
            ReviewChoice::Back => {
                if operator.confirm(
                    "Discard Photos",
                    "Are you sure you want to retake these photos?",
                )? {
                    return Ok(Action::Discard);
                }
            }
        }
    }
}

fn job_complete<O: Operator>(store: &WorkflowStore, operator: &mut O) -> Result<Action> {
    Ok(if operator.acknowledge_job_complete(&store.summary())? {
        Action::AcceptJobComplete
    } else {
        Action::Back
    })
}
