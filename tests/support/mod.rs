//! テスト用の台本付き作業者とカメラ

#![allow(dead_code)]

use async_trait::async_trait;
use crew_photo::camera::{CaptureError, PhotoCapture};
use crew_photo::error::Result;
use crew_photo::operator::{
    CaptureProgress, Operator, ReviewChoice, ReviewSheet, ServiceBoard, ServiceChoice,
};
use crew_photo_common::{JobSummary, Service};
use std::collections::VecDeque;

/// 作業者の回答
#[derive(Debug, Clone)]
pub enum Answer {
    Name(Option<String>),
    Service(ServiceChoice),
    ConfirmService(bool),
    Permission(bool),
    Shutter(bool),
    Review(ReviewChoice),
    Confirm(bool),
    JobComplete(bool),
}

pub fn name(name: &str) -> Answer {
    Answer::Name(Some(name.to_string()))
}

pub fn quit() -> Answer {
    Answer::Name(None)
}

pub fn service(id: &str) -> Answer {
    Answer::Service(ServiceChoice::Service(id.to_string()))
}

pub fn shutters(count: usize) -> Vec<Answer> {
    vec![Answer::Shutter(true); count]
}

/// 台本どおりに答える作業者
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    script: VecDeque<Answer>,
    pub alerts: Vec<(String, String)>,
    pub boards: Vec<ServiceBoard>,
    pub progress: Vec<CaptureProgress>,
    pub sheets: Vec<ReviewSheet>,
    pub summaries: Vec<JobSummary>,
}

impl ScriptedOperator {
    pub fn new(script: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn alert_titles(&self) -> Vec<&str> {
        self.alerts.iter().map(|(t, _)| t.as_str()).collect()
    }

    fn next(&mut self, expected: &str) -> Answer {
        self.script
            .pop_front()
            .unwrap_or_else(|| panic!("台本切れ: {} の回答がない", expected))
    }
}

impl Operator for ScriptedOperator {
    fn crew_name(&mut self) -> Result<Option<String>> {
        match self.next("crew_name") {
            Answer::Name(name) => Ok(name),
            other => panic!("crew_name に {:?}", other),
        }
    }

    fn choose_service(&mut self, board: &ServiceBoard) -> Result<ServiceChoice> {
        self.boards.push(board.clone());
        match self.next("choose_service") {
            Answer::Service(choice) => Ok(choice),
            other => panic!("choose_service に {:?}", other),
        }
    }

    fn confirm_service(&mut self, _service: &Service) -> Result<bool> {
        match self.next("confirm_service") {
            Answer::ConfirmService(ok) => Ok(ok),
            other => panic!("confirm_service に {:?}", other),
        }
    }

    fn grant_permission(&mut self) -> Result<bool> {
        match self.next("grant_permission") {
            Answer::Permission(ok) => Ok(ok),
            other => panic!("grant_permission に {:?}", other),
        }
    }

    fn shutter(&mut self, progress: &CaptureProgress) -> Result<bool> {
        self.progress.push(progress.clone());
        match self.next("shutter") {
            Answer::Shutter(ok) => Ok(ok),
            other => panic!("shutter に {:?}", other),
        }
    }

    fn review(&mut self, sheet: &ReviewSheet) -> Result<ReviewChoice> {
        self.sheets.push(sheet.clone());
        match self.next("review") {
            Answer::Review(choice) => Ok(choice),
            other => panic!("review に {:?}", other),
        }
    }

    fn confirm(&mut self, _title: &str, _message: &str) -> Result<bool> {
        match self.next("confirm") {
            Answer::Confirm(ok) => Ok(ok),
            other => panic!("confirm に {:?}", other),
        }
    }

    fn acknowledge_job_complete(&mut self, summary: &JobSummary) -> Result<bool> {
        self.summaries.push(summary.clone());
        match self.next("acknowledge_job_complete") {
            Answer::JobComplete(ok) => Ok(ok),
            other => panic!("acknowledge_job_complete に {:?}", other),
        }
    }

    fn alert(&mut self, title: &str, message: &str) {
        self.alerts.push((title.to_string(), message.to_string()));
    }
}

/// 連番のURIを返すカメラ
#[derive(Debug, Default)]
pub struct ScriptedCamera {
    /// 許可要求への応答（空ならtrue）
    pub permissions: VecDeque<bool>,
    /// 何回目の撮影（1始まり）を失敗させるか
    pub failures: Vec<usize>,
    pub permission_requests: usize,
    attempts: usize,
    shots: usize,
}

impl ScriptedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uri(n: usize) -> String {
        format!("file:///dcim/{:04}.jpg", n)
    }

    pub fn shots(&self) -> usize {
        self.shots
    }
}

#[async_trait]
impl PhotoCapture for ScriptedCamera {
    async fn request_permission(&mut self) -> bool {
        self.permission_requests += 1;
        self.permissions.pop_front().unwrap_or(true)
    }

    async fn capture(&mut self) -> std::result::Result<String, CaptureError> {
        self.attempts += 1;
        if self.failures.contains(&self.attempts) {
            return Err(CaptureError::Failure("shutter jammed".into()));
        }
        self.shots += 1;
        Ok(Self::uri(self.shots))
    }
}
