//! 사용자 환경설정 모델.
//!
//! 시작 시 한 번 스냅샷으로 로드되고, 이후 각 필드는 독립적으로 저장된다.
//! 필드 간 트랜잭션은 없다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::CoreError;

/// 기본 사용자 이름
pub const DEFAULT_USER_NAME: &str = "User";

/// 기본 어시스턴트 이름
pub const DEFAULT_ASSISTANT_NAME: &str = "Assistant";

/// 앱 목록 표시 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

impl LayoutMode {
    /// 저장 파일에 쓰는 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::List => "list",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "grid" => Ok(LayoutMode::Grid),
            "list" => Ok(LayoutMode::List),
            other => Err(CoreError::Validation {
                field: "layout_mode".to_string(),
                message: format!("알 수 없는 레이아웃: {other}"),
            }),
        }
    }
}

/// 사용자 환경설정 스냅샷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_name: String,
    pub assistant_name: String,
    /// 숨긴 패키지 (삽입 순서 유지)
    pub hidden_packages: Vec<String>,
    /// 독에 고정한 패키지 (고정 순서)
    pub dock_packages: Vec<String>,
    pub show_hidden: bool,
    pub show_names: bool,
    pub layout_mode: LayoutMode,
    /// 사용자 아바타 파일 경로 (없으면 기본 아바타)
    pub avatar_path: Option<PathBuf>,
    /// 마지막 알림 닫은 시각
    pub notification_dismissed_at: Option<DateTime<Utc>>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
            hidden_packages: Vec::new(),
            dock_packages: Vec::new(),
            show_hidden: false,
            show_names: true,
            layout_mode: LayoutMode::Grid,
            avatar_path: None,
            notification_dismissed_at: None,
        }
    }
}

/// 개별 저장 단위 (필드 하나 = 파일 하나)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    UserName,
    AssistantName,
    HiddenPackages,
    DockPackages,
    ShowHidden,
    ShowNames,
    LayoutMode,
    Avatar,
    NotificationDismissed,
}

impl PreferenceKey {
    /// 모든 키
    pub const ALL: [PreferenceKey; 9] = [
        PreferenceKey::UserName,
        PreferenceKey::AssistantName,
        PreferenceKey::HiddenPackages,
        PreferenceKey::DockPackages,
        PreferenceKey::ShowHidden,
        PreferenceKey::ShowNames,
        PreferenceKey::LayoutMode,
        PreferenceKey::Avatar,
        PreferenceKey::NotificationDismissed,
    ];

    /// 데이터 디렉토리 안의 파일 이름
    pub fn file_name(&self) -> &'static str {
        match self {
            PreferenceKey::UserName => "user.txt",
            PreferenceKey::AssistantName => "assistant_name.txt",
            PreferenceKey::HiddenPackages => "hidden.json",
            PreferenceKey::DockPackages => "dock.json",
            PreferenceKey::ShowHidden => "show_hidden.txt",
            PreferenceKey::ShowNames => "show_names.txt",
            PreferenceKey::LayoutMode => "layout_mode.txt",
            PreferenceKey::Avatar => "avatar.b64",
            PreferenceKey::NotificationDismissed => "notif_dismissed.txt",
        }
    }
}

/// 필드 하나의 새 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceUpdate {
    UserName(String),
    AssistantName(String),
    HiddenPackages(Vec<String>),
    DockPackages(Vec<String>),
    ShowHidden(bool),
    ShowNames(bool),
    LayoutMode(LayoutMode),
    /// 원본 이미지 바이트 (저장 시 base64 인코딩)
    Avatar(Vec<u8>),
    NotificationDismissed(DateTime<Utc>),
}

impl PreferenceUpdate {
    /// 대상 키
    pub fn key(&self) -> PreferenceKey {
        match self {
            PreferenceUpdate::UserName(_) => PreferenceKey::UserName,
            PreferenceUpdate::AssistantName(_) => PreferenceKey::AssistantName,
            PreferenceUpdate::HiddenPackages(_) => PreferenceKey::HiddenPackages,
            PreferenceUpdate::DockPackages(_) => PreferenceKey::DockPackages,
            PreferenceUpdate::ShowHidden(_) => PreferenceKey::ShowHidden,
            PreferenceUpdate::ShowNames(_) => PreferenceKey::ShowNames,
            PreferenceUpdate::LayoutMode(_) => PreferenceKey::LayoutMode,
            PreferenceUpdate::Avatar(_) => PreferenceKey::Avatar,
            PreferenceUpdate::NotificationDismissed(_) => PreferenceKey::NotificationDismissed,
        }
    }
}

/// `"true"`/`"false"` 텍스트 파싱
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// 첫 등장 순서를 유지한 패키지 ID 중복 제거
pub fn dedupe_packages(packages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(packages.len());
    packages
        .into_iter()
        .filter(|pkg| seen.insert(pkg.clone()))
        .collect()
}
