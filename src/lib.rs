//! crew-photo
//!
//! 現場作業サービスの写真記録ワークフロー（端末版ホスト）
//!
//! ワークフローの状態と画面遷移は `crew_photo_common` にあり、ここでは
//! 画面スタック・対話・カメラといったホスト側の機能を提供する。

pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod navigator;
pub mod operator;
pub mod screens;
