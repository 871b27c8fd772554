//! 作業者とのやり取り
//!
//! 画面は `Operator` を通して入力を受け取る。端末では dialoguer で対話し、
//! テストでは台本どおりに答える実装に差し替える。

use crate::error::Result;
use crew_photo_common::{JobSummary, PhotoSet, ReviewSelection, Service};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// サービス選択画面の表示内容
#[derive(Debug, Clone)]
pub struct ServiceBoard {
    pub crew_name: String,
    pub entries: Vec<BoardEntry>,
    /// 「Fully Complete」を出せるか
    pub can_finish: bool,
}

#[derive(Debug, Clone)]
pub struct BoardEntry {
    pub service: Service,
    pub completed: bool,
}

impl ServiceBoard {
    /// 選択可能（未完了）なサービス
    pub fn selectable(&self) -> impl Iterator<Item = &Service> {
        self.entries.iter().filter(|e| !e.completed).map(|e| &e.service)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceChoice {
    Service(String),
    FullyComplete,
    Back,
}

/// 撮影画面の進捗
#[derive(Debug, Clone)]
pub struct CaptureProgress {
    pub service_name: String,
    pub set: PhotoSet,
    pub taken: usize,
    pub required: usize,
}

impl CaptureProgress {
    pub fn remaining(&self) -> usize {
        self.required.saturating_sub(self.taken)
    }

    /// 例: "Capture 3 more photos"
    pub fn instruction(&self) -> String {
        let remaining = self.remaining();
        format!(
            "Capture {} more photo{}",
            remaining,
            if remaining != 1 { "s" } else { "" }
        )
    }
}

/// レビュー画面の表示内容
#[derive(Debug, Clone)]
pub struct ReviewSheet {
    pub service_name: String,
    pub set: PhotoSet,
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewChoice {
    Approve(ReviewSelection),
    RemoveSelected(ReviewSelection),
    Back,
}

pub trait Operator {
    /// 作業者名。Noneで終了
    fn crew_name(&mut self) -> Result<Option<String>>;

    fn choose_service(&mut self, board: &ServiceBoard) -> Result<ServiceChoice>;

    /// 「Take Pictures」ならtrue、「Cancel」ならfalse
    fn confirm_service(&mut self, service: &Service) -> Result<bool>;

    /// カメラ許可を再要求するならtrue、戻るならfalse
    fn grant_permission(&mut self) -> Result<bool>;

    /// シャッターを押すならtrue、戻るならfalse
    fn shutter(&mut self, progress: &CaptureProgress) -> Result<bool>;

    fn review(&mut self, sheet: &ReviewSheet) -> Result<ReviewChoice>;

    /// 破壊的操作の確認
    fn confirm(&mut self, title: &str, message: &str) -> Result<bool>;

    /// ジョブ完了の確認。trueで全状態をリセット
    fn acknowledge_job_complete(&mut self, summary: &JobSummary) -> Result<bool>;

    fn alert(&mut self, title: &str, message: &str);
}

/// サービスの一覧表示用ラベル
pub fn service_label(service: &Service, completed: bool) -> String {
    let mut label = format!(
        "{} [{}]",
        service.name,
        if service.required { "Required" } else { "Optional" }
    );
    if service.ruler_photos {
        label.push_str(" +ruler");
    }
    if completed {
        label.push_str(" ✔");
    }
    label
}

/// 端末での対話
#[derive(Debug, Default)]
pub struct DialoguerOperator;

impl DialoguerOperator {
    pub fn new() -> Self {
        Self
    }

    fn print_progress(progress: &CaptureProgress) {
        let style = ProgressStyle::with_template("{msg} [{bar:20.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::new(progress.required as u64)
            .with_style(style)
            .with_message(format!("{} - {}", progress.service_name, progress.set.title()));
        bar.set_position(progress.taken as u64);
        bar.abandon();
    }
}

impl Operator for DialoguerOperator {
    fn crew_name(&mut self) -> Result<Option<String>> {
        println!("\nEnter Crew Member Name (empty to quit)");
        let input: String = Input::new()
            .with_prompt("Crew Member Name")
            .allow_empty(true)
            .interact_text()?;

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(trimmed.to_string()))
    }

    fn choose_service(&mut self, board: &ServiceBoard) -> Result<ServiceChoice> {
        println!("\nWelcome, {}", board.crew_name);
        println!("Select a service");
        for entry in &board.entries {
            println!("  {}", service_label(&entry.service, entry.completed));
        }

        let services: Vec<&Service> = board.selectable().collect();
        let mut items: Vec<String> = services.iter().map(|s| service_label(s, false)).collect();
        if board.can_finish {
            items.push("Fully Complete".to_string());
        }
        items.push("Back".to_string());

        let picked = Select::new()
            .with_prompt("Service")
            .items(&items)
            .default(0)
            .interact_opt()?;

        Ok(match picked {
            Some(i) if i < services.len() => ServiceChoice::Service(services[i].id.clone()),
            Some(i) if board.can_finish && i == services.len() => ServiceChoice::FullyComplete,
            _ => ServiceChoice::Back,
        })
    }

    fn confirm_service(&mut self, service: &Service) -> Result<bool> {
        println!("\nReady to Take Photos?");
        println!("You selected the following service:");
        println!("  • {}", service.name);

        let picked = Select::new()
            .items(&["Take Pictures", "Cancel"])
            .default(0)
            .interact_opt()?;
        Ok(picked == Some(0))
    }

    fn grant_permission(&mut self) -> Result<bool> {
        println!("\nCamera Access Required");
        println!("We need access to your camera to capture service photos.");
        Ok(Confirm::new()
            .with_prompt("Grant Permission")
            .default(true)
            .interact()?)
    }

    fn shutter(&mut self, progress: &CaptureProgress) -> Result<bool> {
        Self::print_progress(progress);
        let picked = Select::new()
            .with_prompt(progress.instruction())
            .items(&["Capture", "Back"])
            .default(0)
            .interact_opt()?;
        Ok(picked == Some(0))
    }

    fn review(&mut self, sheet: &ReviewSheet) -> Result<ReviewChoice> {
        println!("\n{} - {}", sheet.service_name, sheet.set.title());
        let picked = MultiSelect::new()
            .with_prompt("Mark photos (space to toggle, enter to continue)")
            .items(&sheet.photos[..])
            .interact()?;
        let selection = ReviewSelection::from_indices(sheet.photos.len(), picked);

        let action = Select::new()
            .with_prompt(format!("{} selected", selection.count()))
            .items(&["Approve", "Remove selected & retake", "Back"])
            .default(0)
            .interact_opt()?;

        Ok(match action {
            Some(0) => ReviewChoice::Approve(selection),
            Some(1) => ReviewChoice::RemoveSelected(selection),
            _ => ReviewChoice::Back,
        })
    }

    fn confirm(&mut self, title: &str, message: &str) -> Result<bool> {
        println!("\n{}", title);
        Ok(Confirm::new().with_prompt(message).default(false).interact()?)
    }

    fn acknowledge_job_complete(&mut self, summary: &JobSummary) -> Result<bool> {
        println!("\nJob Complete");
        println!(
            "Great work, {}! All required services are complete.",
            summary.crew_name
        );
        for service in &summary.services {
            println!(
                "  ✔ {} (main {}, ruler {})",
                service.name, service.main_photos, service.ruler_photos
            );
        }

        let picked = Select::new()
            .items(&["Start New Job", "Close"])
            .default(0)
            .interact_opt()?;
        Ok(picked == Some(0))
    }

    fn alert(&mut self, title: &str, message: &str) {
        println!("\n⚠ {}: {}", title, message);
    }
}
