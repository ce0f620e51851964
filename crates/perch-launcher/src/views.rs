//! 파생 뷰 계산.
//!
//! 카탈로그, 숨김 집합, 독 목록, show-hidden 플래그에서 세 뷰를 만든다.
//! 순수 함수이며 모든 변경 직후와 카탈로그 교체 직후 다시 계산된다.

use perch_core::models::app::{AppRecord, Catalog};
use serde::Serialize;

use crate::dock::{DockList, HiddenSet};

/// 앱 하나의 현재 상태 (저장하지 않고 파생)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppMode {
    Visible,
    Hidden,
    Docked,
}

impl AppMode {
    /// 숨김/독 소속으로 상태 판정 (독 우선)
    pub fn of(package_id: &str, hidden: &HiddenSet, dock: &DockList) -> Self {
        if dock.contains(package_id) {
            AppMode::Docked
        } else if hidden.contains(package_id) {
            AppMode::Hidden
        } else {
            AppMode::Visible
        }
    }
}

/// 렌더링용 뷰 묶음
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LauncherViews {
    /// 독에 표시할 앱 (독 순서, 표시 슬롯 수만큼)
    pub dock_apps: Vec<AppRecord>,
    /// 그리드/리스트에 표시할 앱 (카탈로그 순서)
    pub visible_apps: Vec<AppRecord>,
    /// 숨김 관리 화면용 앱 (카탈로그 순서)
    pub hidden_apps: Vec<AppRecord>,
}

/// 세 뷰 계산
pub fn compute_views(
    catalog: &Catalog,
    hidden: &HiddenSet,
    dock: &DockList,
    show_hidden: bool,
    visible_slots: usize,
) -> LauncherViews {
    let dock_apps = dock
        .as_slice()
        .iter()
        .filter_map(|pkg| catalog.get(pkg))
        .take(visible_slots)
        .cloned()
        .collect();

    let visible_apps = catalog
        .iter()
        .filter(|app| !dock.contains(&app.package_id))
        .filter(|app| show_hidden || !hidden.contains(&app.package_id))
        .cloned()
        .collect();

    let hidden_apps = catalog
        .iter()
        .filter(|app| hidden.contains(&app.package_id))
        .cloned()
        .collect();

    LauncherViews {
        dock_apps,
        visible_apps,
        hidden_apps,
    }
}
