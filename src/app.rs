//! セッション
//!
//! ストア・画面スタック・作業者・カメラを所有し、画面を一つずつ進める。
//! ストアはセッション開始時に作られ、ジョブ完了時にリセットされる。

use crate::camera::PhotoCapture;
use crate::error::Result;
use crate::navigator::Navigator;
use crate::operator::Operator;
use crate::screens::{self, HostState};
use crew_photo_common::flow::check_route;
use crew_photo_common::{Flow, FlowError, Route, ServiceCatalog, WorkflowStore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct Session<O, C> {
    store: WorkflowStore,
    navigator: Navigator,
    operator: O,
    camera: C,
    host: HostState,
}

impl<O, C> Session<O, C>
where
    O: Operator,
    C: PhotoCapture,
{
    pub fn new(catalog: ServiceCatalog, operator: O, camera: C) -> Self {
        Self {
            store: WorkflowStore::new(catalog),
            navigator: Navigator::new(&Route::NameEntry),
            operator,
            camera,
            host: HostState::default(),
        }
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// 外部からの遷移要求などでスタックを直接操作する
    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn operator(&self) -> &O {
        &self.operator
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// 撮影待ち中か
    pub fn capture_in_flight(&self) -> bool {
        self.host.capture.in_flight()
    }

    /// Ctrl-C の監視タスクを起動する
    ///
    /// 監視を始めるとSIGINTの既定動作は無効になるため、撮影待ち以外で
    /// 受け取ったら終了コード130でプロセスを終了する。
    pub fn spawn_interrupt_handler(&self) -> JoinHandle<()> {
        let capture = self.host.capture.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if capture.in_flight() {
                    debug!("capture cancelled by interrupt");
                    continue;
                }
                warn!("interrupted");
                std::process::exit(130);
            }
        })
    }

    /// スタックが空になるまで画面を進める
    pub async fn run(&mut self) -> Result<()> {
        while self.step().await? {}
        Ok(())
    }

    /// 一画面分進める。スタックが空ならfalse
    pub async fn step(&mut self) -> Result<bool> {
        let Some(entry) = self.navigator.current().cloned() else {
            return Ok(false);
        };

        // 不正なパラメータ・未知のサービス・ストアと食い違うルートは表示せずに戻る
        let route = match Route::decode(entry.screen, &entry.params, self.store.catalog()) {
            Ok(route) => route,
            Err(err) => {
                warn!(screen = %entry.screen, error = %err, "route rejected");
                self.navigator.back();
                return Ok(!self.navigator.is_empty());
            }
        };
        if let Err(err) = check_route(&self.store, &route) {
            warn!(screen = %entry.screen, error = %err, "stale route rejected");
            self.navigator.back();
            return Ok(!self.navigator.is_empty());
        }

        let action = screens::present(
            &route,
            &self.store,
            &mut self.operator,
            &mut self.camera,
            &mut self.host,
        )
        .await?;

        match Flow::new(&mut self.store).apply(&route, action) {
            Ok(navigation) => self.navigator.navigate(navigation),
            Err(FlowError::Validation(err)) => {
                debug!(error = %err, "validation failed");
                self.operator.alert(err.title(), &err.message());
            }
            Err(err) => {
                warn!(screen = %entry.screen, error = %err, "flow action rejected");
                self.operator.alert("Error", &err.to_string());
            }
        }

        Ok(!self.navigator.is_empty())
    }
}
