//! 조정 엔진.
//!
//! 카탈로그, 숨김 집합, 독 목록, 표시 설정을 소유하고 세 뷰를 유지한다.
//! 모든 변경은 메모리에 먼저 반영하고 뷰를 다시 계산한 뒤 저장을 요청한다.
//! 저장 실패는 로그로 남기고 되돌리지 않는다.
//!
//! 상시 불변식: 숨김 집합과 독 목록은 겹치지 않는다.

use chrono::{DateTime, Utc};
use perch_core::config::DockConfig;
use perch_core::error::CoreError;
use perch_core::models::app::Catalog;
use perch_core::models::preferences::{LayoutMode, PreferenceUpdate, UserPreferences};
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::preferences::PreferenceStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::catalog::AppCatalog;
use crate::dock::{DockList, HiddenSet};
use crate::views::{compute_views, AppMode, LauncherViews};

/// 독 고정 토글 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// 독에 추가됨 (숨김 상태였으면 함께 해제됨)
    Pinned { unhidden: bool },
    /// 독에서 제거됨
    Unpinned,
    /// 독이 가득 차서 거부됨 (상태 변경 없음)
    RejectedFull { capacity: usize },
}

impl PinOutcome {
    /// 사용자 토스트 문구
    pub fn message(&self) -> String {
        match self {
            PinOutcome::Pinned { unhidden: false } => "Pinned to Dock".to_string(),
            PinOutcome::Pinned { unhidden: true } => "Pinned to Dock & Unhidden".to_string(),
            PinOutcome::Unpinned => "Unpinned from Dock".to_string(),
            PinOutcome::RejectedFull { capacity } => {
                CoreError::DockFull {
                    capacity: *capacity,
                }
                .user_message()
            }
        }
    }
}

impl fmt::Display for PinOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// 목록 외 표시 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    pub user_name: String,
    pub assistant_name: String,
    pub show_hidden: bool,
    pub show_names: bool,
    pub layout_mode: LayoutMode,
    /// 사용자 아바타가 저장되어 있는지
    pub custom_avatar: bool,
    pub notification_dismissed_at: Option<DateTime<Utc>>,
}

impl From<&UserPreferences> for LauncherSettings {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            user_name: prefs.user_name.clone(),
            assistant_name: prefs.assistant_name.clone(),
            show_hidden: prefs.show_hidden,
            show_names: prefs.show_names,
            layout_mode: prefs.layout_mode,
            custom_avatar: prefs.avatar_path.is_some(),
            notification_dismissed_at: prefs.notification_dismissed_at,
        }
    }
}

/// 조정 엔진
pub struct Reconciler {
    catalog: AppCatalog,
    store: Arc<dyn PreferenceStore>,
    hidden: HiddenSet,
    dock: DockList,
    settings: LauncherSettings,
    visible_slots: usize,
    views: LauncherViews,
}

impl Reconciler {
    /// 저장된 환경설정을 읽어 엔진 생성 (카탈로그는 비어 있음)
    pub async fn load(
        package_manager: Arc<dyn PackageManager>,
        store: Arc<dyn PreferenceStore>,
        dock_config: &DockConfig,
    ) -> Result<Self, CoreError> {
        let prefs = store.load().await?;
        Ok(Self::from_preferences(
            package_manager,
            store,
            dock_config,
            &prefs,
        ))
    }

    /// 이미 읽은 환경설정으로 엔진 생성
    pub fn from_preferences(
        package_manager: Arc<dyn PackageManager>,
        store: Arc<dyn PreferenceStore>,
        dock_config: &DockConfig,
        prefs: &UserPreferences,
    ) -> Self {
        let dock = DockList::from_packages(prefs.dock_packages.clone(), dock_config.capacity);
        let mut hidden = HiddenSet::from_packages(prefs.hidden_packages.clone());
        for pkg in dock.as_slice() {
            if hidden.remove(pkg) {
                warn!("독과 숨김에 모두 있는 패키지, 독 우선: {pkg}");
            }
        }

        let mut reconciler = Self {
            catalog: AppCatalog::new(package_manager),
            store,
            hidden,
            dock,
            settings: LauncherSettings::from(prefs),
            visible_slots: dock_config.visible_slots,
            views: LauncherViews::default(),
        };
        reconciler.recompute_views();

        info!(
            "조정 엔진 초기화: dock={}, hidden={}",
            reconciler.dock.len(),
            reconciler.hidden.len()
        );
        reconciler
    }

    // ── 조회 ─────────────────────────────────────────

    pub fn views(&self) -> &LauncherViews {
        &self.views
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.snapshot()
    }

    /// 카탈로그 새로고침 성공 횟수
    pub fn catalog_generation(&self) -> u64 {
        self.catalog.generation()
    }

    pub fn dock(&self) -> &DockList {
        &self.dock
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    pub fn settings(&self) -> &LauncherSettings {
        &self.settings
    }

    /// 앱 상태. 카탈로그에 없으면 None
    pub fn mode_of(&self, package_id: &str) -> Option<AppMode> {
        if !self.catalog.snapshot().contains(package_id) {
            return None;
        }
        Some(AppMode::of(package_id, &self.hidden, &self.dock))
    }

    /// 뷰 재계산
    pub fn recompute_views(&mut self) {
        self.views = compute_views(
            self.catalog.snapshot(),
            &self.hidden,
            &self.dock,
            self.settings.show_hidden,
            self.visible_slots,
        );
    }

    // ── 카탈로그 ─────────────────────────────────────

    /// 카탈로그 새로고침 후 뷰 재계산
    ///
    /// 실패하면 이전 카탈로그와 뷰를 그대로 유지한다.
    pub async fn refresh_catalog(&mut self) -> Result<usize, CoreError> {
        let count = self.catalog.refresh().await?.len();
        self.recompute_views();
        debug!(
            "뷰 갱신: dock={}, visible={}, hidden={}",
            self.views.dock_apps.len(),
            self.views.visible_apps.len(),
            self.views.hidden_apps.len()
        );
        Ok(count)
    }

    /// 앱 실행
    pub async fn launch(&self, package_id: &str) -> Result<(), CoreError> {
        self.catalog
            .package_manager()
            .launch_app(package_id)
            .await
            .inspect_err(|e| warn!("앱 실행 실패: {e}"))
    }

    // ── 숨김 / 독 ────────────────────────────────────

    /// 숨김. 이미 숨겨져 있으면 false
    ///
    /// 독에 있던 앱이면 독에서 먼저 제거한다.
    pub async fn hide(&mut self, package_id: &str) -> Result<bool, CoreError> {
        if self.hidden.contains(package_id) {
            return Ok(false);
        }
        self.require_installed(package_id)?;

        let undocked = self.dock.remove(package_id);
        self.hidden.insert(package_id);
        self.recompute_views();
        info!("앱 숨김: {package_id} (독 해제: {undocked})");

        let dock_saved = if undocked {
            self.persist_dock().await
        } else {
            Ok(())
        };
        let hidden_saved = self.persist_hidden().await;
        dock_saved.and(hidden_saved)?;
        Ok(true)
    }

    /// 숨김 해제. 숨겨져 있지 않으면 false
    pub async fn unhide(&mut self, package_id: &str) -> Result<bool, CoreError> {
        if !self.hidden.remove(package_id) {
            return Ok(false);
        }
        self.recompute_views();
        info!("앱 숨김 해제: {package_id}");

        self.persist_hidden().await?;
        Ok(true)
    }

    /// 독 고정 토글
    pub async fn pin_to_dock(&mut self, package_id: &str) -> Result<PinOutcome, CoreError> {
        if self.dock.remove(package_id) {
            self.recompute_views();
            info!("독 고정 해제: {package_id}");
            self.persist_dock().await?;
            return Ok(PinOutcome::Unpinned);
        }

        self.require_installed(package_id)?;

        if let Err(CoreError::DockFull { capacity }) = self.dock.push(package_id) {
            debug!("독 가득 참, 고정 거부: {package_id}");
            return Ok(PinOutcome::RejectedFull { capacity });
        }

        let unhidden = self.hidden.remove(package_id);
        self.recompute_views();
        info!("독 고정: {package_id} (숨김 해제: {unhidden})");

        let dock_saved = self.persist_dock().await;
        let hidden_saved = if unhidden {
            self.persist_hidden().await
        } else {
            Ok(())
        };
        dock_saved.and(hidden_saved)?;
        Ok(PinOutcome::Pinned { unhidden })
    }

    /// 삭제 흐름 시작
    ///
    /// 카탈로그와 독에서 즉시 제거하고 OS 삭제 UI를 띄운다.
    /// 호출자는 확인용 지연 새로고침을 한 번 예약해야 한다.
    pub async fn uninstall(&mut self, package_id: &str) -> Result<(), CoreError> {
        let removed = self.catalog.remove(package_id);
        let undocked = self.dock.remove(package_id);
        self.recompute_views();
        info!("앱 삭제 요청: {package_id} (카탈로그: {removed}, 독: {undocked})");

        self.catalog.package_manager().request_uninstall(package_id);

        if undocked {
            self.persist_dock().await?;
        }
        Ok(())
    }

    // ── 설정 ─────────────────────────────────────────

    pub async fn set_user_name(&mut self, name: &str) -> Result<(), CoreError> {
        let name = non_empty("user_name", name)?;
        self.settings.user_name = name.clone();
        self.persist(PreferenceUpdate::UserName(name)).await
    }

    pub async fn set_assistant_name(&mut self, name: &str) -> Result<(), CoreError> {
        let name = non_empty("assistant_name", name)?;
        self.settings.assistant_name = name.clone();
        self.persist(PreferenceUpdate::AssistantName(name)).await
    }

    pub async fn set_show_hidden(&mut self, show: bool) -> Result<(), CoreError> {
        self.settings.show_hidden = show;
        self.recompute_views();
        self.persist(PreferenceUpdate::ShowHidden(show)).await
    }

    pub async fn set_show_names(&mut self, show: bool) -> Result<(), CoreError> {
        self.settings.show_names = show;
        self.persist(PreferenceUpdate::ShowNames(show)).await
    }

    pub async fn set_layout_mode(&mut self, mode: LayoutMode) -> Result<(), CoreError> {
        self.settings.layout_mode = mode;
        self.persist(PreferenceUpdate::LayoutMode(mode)).await
    }

    /// 아바타 이미지 저장
    pub async fn set_avatar(&mut self, image: Vec<u8>) -> Result<(), CoreError> {
        if image.is_empty() {
            return Err(CoreError::Validation {
                field: "avatar".to_string(),
                message: "빈 이미지".to_string(),
            });
        }
        self.settings.custom_avatar = true;
        self.persist(PreferenceUpdate::Avatar(image)).await
    }

    /// 알림 닫은 시각 기록
    pub async fn record_notification_dismissed(
        &mut self,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.settings.notification_dismissed_at = Some(at);
        self.persist(PreferenceUpdate::NotificationDismissed(at))
            .await
    }

    // ── 내부 ─────────────────────────────────────────

    fn require_installed(&self, package_id: &str) -> Result<(), CoreError> {
        if self.catalog.snapshot().contains(package_id) {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                resource_type: "App".to_string(),
                id: package_id.to_string(),
            })
        }
    }

    async fn persist_dock(&self) -> Result<(), CoreError> {
        self.persist(PreferenceUpdate::DockPackages(self.dock.to_vec()))
            .await
    }

    async fn persist_hidden(&self) -> Result<(), CoreError> {
        self.persist(PreferenceUpdate::HiddenPackages(self.hidden.to_vec()))
            .await
    }

    async fn persist(&self, update: PreferenceUpdate) -> Result<(), CoreError> {
        let key = update.key();
        self.store.save(update).await.inspect_err(|e| {
            error!("환경설정 저장 실패 ({}): {e}", key.file_name());
        })
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            field: field.to_string(),
            message: "비어 있을 수 없음".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
