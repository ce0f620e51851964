//! 콘솔 어댑터.
//!
//! 터미널용 알림기(Notifier), 파일 경로 기반 이미지 선택기(ImagePicker),
//! 화면 상태 텍스트 렌더링.

use async_trait::async_trait;
use chrono::NaiveDate;
use perch_core::error::CoreError;
use perch_core::models::app::AppRecord;
use perch_core::models::preferences::LayoutMode;
use perch_core::ports::image_picker::ImagePicker;
use perch_core::ports::notifier::Notifier;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::runtime::ScreenState;

/// 아바타 이미지 최대 크기
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// 표준 출력 알림기
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn show_notification(&self, title: &str, body: &str) -> Result<(), CoreError> {
        println!("💬 {title}: {body}");
        Ok(())
    }

    async fn show_toast(&self, message: &str) -> Result<(), CoreError> {
        println!("✅ {message}");
        Ok(())
    }

    async fn show_error(&self, message: &str) -> Result<(), CoreError> {
        eprintln!("❌ {message}");
        Ok(())
    }
}

/// 미리 지정한 파일을 읽는 이미지 선택기
#[derive(Debug, Clone)]
pub struct PathImagePicker {
    path: Option<PathBuf>,
}

impl PathImagePicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ImagePicker for PathImagePicker {
    async fn pick_image(&self) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(path) = &self.path else {
            debug!("이미지 선택 취소");
            return Ok(None);
        };

        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(CoreError::Validation {
                field: "avatar".to_string(),
                message: format!("파일이 아님: {}", path.display()),
            });
        }
        if meta.len() > MAX_AVATAR_BYTES {
            return Err(CoreError::Validation {
                field: "avatar".to_string(),
                message: format!("이미지가 너무 큼: {} bytes", meta.len()),
            });
        }

        let bytes = tokio::fs::read(path).await?;
        info!("아바타 이미지 선택: {} ({} bytes)", path.display(), bytes.len());
        Ok(Some(bytes))
    }
}

fn app_line(out: &mut String, app: &AppRecord, show_names: bool) {
    if show_names {
        let _ = writeln!(out, "  • {:<24} {}", app.label, app.package_id);
    } else {
        let _ = writeln!(out, "  • {}", app.package_id);
    }
}

fn app_grid(out: &mut String, apps: &[AppRecord], show_names: bool) {
    for row in apps.chunks(4) {
        let cells: Vec<String> = row
            .iter()
            .map(|app| {
                let text = if show_names { &app.label } else { &app.package_id };
                format!("[{text:^14}]")
            })
            .collect();
        let _ = writeln!(out, "  {}", cells.join(" "));
    }
}

/// 화면 상태를 텍스트로 렌더링
pub fn render_screen(state: &ScreenState, today: NaiveDate) -> String {
    let settings = &state.settings;
    let views = &state.views;
    let mut out = String::new();

    let _ = writeln!(out, "Hi, {}!", settings.user_name);
    if let Some(message) = &state.notification {
        let _ = writeln!(out, "💬 {}: {message}", settings.assistant_name);
    }

    let _ = writeln!(out, "\nApps ({})", views.visible_apps.len());
    match settings.layout_mode {
        LayoutMode::Grid => app_grid(&mut out, &views.visible_apps, settings.show_names),
        LayoutMode::List => views
            .visible_apps
            .iter()
            .for_each(|app| app_line(&mut out, app, settings.show_names)),
    }

    let _ = writeln!(out, "\nDock");
    if views.dock_apps.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for app in &views.dock_apps {
        app_line(&mut out, app, true);
    }

    if !views.hidden_apps.is_empty() {
        let _ = writeln!(out, "\nHidden ({})", views.hidden_apps.len());
        for app in &views.hidden_apps {
            app_line(&mut out, app, true);
        }
    }

    if !state.todos.is_empty() {
        let _ = writeln!(out, "\nTo-do");
        for (i, todo) in state.todos.iter().enumerate() {
            let mark = if todo.done { "x" } else { " " };
            let _ = writeln!(out, "  {}. [{mark}] {}", i + 1, todo.text);
        }
    }

    if !state.countdowns.is_empty() {
        let _ = writeln!(out, "\nCountdown");
        for item in &state.countdowns {
            let _ = writeln!(
                out,
                "  {} - {} ({})",
                item.name,
                item.target.format("%d %b %Y"),
                item.label(today)
            );
        }
    }

    out
}
