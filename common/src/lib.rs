//! Crew Photo Common Library
//!
//! 現場作業の写真記録ワークフローで共有される型と状態機械
//!
//! - catalog: 作業サービスの一覧
//! - store: セッション状態（作業者名・完了サービス・写真）
//! - route: 画面ごとの型付きルートとパラメータ
//! - flow: 画面遷移の状態機械

pub mod catalog;
pub mod error;
pub mod flow;
pub mod route;
pub mod store;
pub mod types;

pub use catalog::{Service, ServiceCatalog};
pub use error::{Error, Result};
pub use flow::{Action, Flow, FlowError, Navigation, ReviewSelection, ValidationError};
pub use route::{CapturePass, ParamBag, Route, RouteError, Screen};
pub use store::{JobSummary, ServiceSummary, WorkflowStore};
pub use types::{PhotoRecord, PhotoSet};
