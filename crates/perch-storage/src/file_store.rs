//! 필드별 플랫 파일 환경설정 저장소.
//!
//! 데이터 디렉토리 안에 필드 하나당 파일 하나를 둔다.
//! 로드는 필드 단위로 관대하게(누락/손상 → 기본값), 저장은 원자적 교체로 처리한다.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use perch_core::config::DockConfig;
use perch_core::error::CoreError;
use perch_core::models::preferences::{
    dedupe_packages, parse_flag, LayoutMode, PreferenceKey, PreferenceUpdate, UserPreferences,
};
use perch_core::ports::preferences::PreferenceStore;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::atomic::write_atomic_async;

/// 플랫 파일 환경설정 저장소
pub struct FilePreferenceStore {
    /// 데이터 디렉토리
    dir: PathBuf,
    /// 로드 시 독 목록을 자르는 최대 개수
    dock_capacity: usize,
}

impl FilePreferenceStore {
    /// 데이터 디렉토리를 준비하고 저장소 생성
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            CoreError::Storage(format!("데이터 디렉토리 생성 실패: {}: {e}", dir.display()))
        })?;

        info!("환경설정 저장소 초기화: {}", dir.display());

        Ok(Self {
            dir,
            dock_capacity: DockConfig::default().capacity,
        })
    }

    /// 독 최대 개수 지정
    pub fn with_dock_capacity(mut self, capacity: usize) -> Self {
        self.dock_capacity = capacity;
        self
    }

    /// 데이터 디렉토리 경로
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 키에 해당하는 파일 경로
    pub fn path_for(&self, key: PreferenceKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// 필드 파일 읽기. 없거나 읽을 수 없으면 None
    async fn read_field(&self, key: PreferenceKey) -> Option<String> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("환경설정 파일 읽기 실패, 기본값 사용: {}: {e}", path.display());
                None
            }
        }
    }

    /// 텍스트 필드 (빈 값이면 기본값)
    async fn read_text(&self, key: PreferenceKey, default: &str) -> String {
        match self.read_field(key).await {
            Some(text) if !text.trim().is_empty() => text.trim_end_matches(['\r', '\n']).to_string(),
            _ => default.to_string(),
        }
    }

    /// 패키지 목록 필드 (JSON 배열, 중복 제거)
    async fn read_packages(&self, key: PreferenceKey) -> Vec<String> {
        let Some(text) = self.read_field(key).await else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(list) => dedupe_packages(list),
            Err(e) => {
                warn!("{} 손상, 빈 목록 사용: {e}", key.file_name());
                Vec::new()
            }
        }
    }

    /// 불리언 필드
    async fn read_flag(&self, key: PreferenceKey, default: bool) -> bool {
        match self.read_field(key).await {
            Some(text) => parse_flag(&text).unwrap_or_else(|| {
                warn!("{} 값 해석 불가 ({:?}), 기본값 사용", key.file_name(), text.trim());
                default
            }),
            None => default,
        }
    }

    async fn read_layout(&self) -> LayoutMode {
        match self.read_field(PreferenceKey::LayoutMode).await {
            Some(text) => text.parse().unwrap_or_else(|e| {
                warn!("레이아웃 값 해석 불가, 기본값 사용: {e}");
                LayoutMode::default()
            }),
            None => LayoutMode::default(),
        }
    }

    async fn read_dismissed_at(&self) -> Option<DateTime<Utc>> {
        let text = self.read_field(PreferenceKey::NotificationDismissed).await?;
        match DateTime::parse_from_rfc3339(text.trim()) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!("알림 닫은 시각 해석 불가, 무시: {e}");
                None
            }
        }
    }

    async fn avatar_path(&self) -> Option<PathBuf> {
        let path = self.path_for(PreferenceKey::Avatar);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
            _ => None,
        }
    }
}

/// 저장 형식으로 인코딩
fn encode(update: &PreferenceUpdate) -> Result<Vec<u8>, CoreError> {
    let bytes = match update {
        PreferenceUpdate::UserName(name) | PreferenceUpdate::AssistantName(name) => {
            name.clone().into_bytes()
        }
        PreferenceUpdate::HiddenPackages(list) | PreferenceUpdate::DockPackages(list) => {
            serde_json::to_vec(list)?
        }
        PreferenceUpdate::ShowHidden(flag) | PreferenceUpdate::ShowNames(flag) => {
            flag.to_string().into_bytes()
        }
        PreferenceUpdate::LayoutMode(mode) => mode.as_str().as_bytes().to_vec(),
        PreferenceUpdate::Avatar(image) => STANDARD.encode(image).into_bytes(),
        PreferenceUpdate::NotificationDismissed(at) => at.to_rfc3339().into_bytes(),
    };
    Ok(bytes)
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn load(&self) -> Result<UserPreferences, CoreError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CoreError::Storage(format!("데이터 디렉토리 접근 실패: {}: {e}", self.dir.display()))
        })?;

        let defaults = UserPreferences::default();

        let (user_name, assistant_name, hidden, mut dock) = tokio::join!(
            self.read_text(PreferenceKey::UserName, &defaults.user_name),
            self.read_text(PreferenceKey::AssistantName, &defaults.assistant_name),
            self.read_packages(PreferenceKey::HiddenPackages),
            self.read_packages(PreferenceKey::DockPackages),
        );
        let (show_hidden, show_names, layout_mode, avatar_path, notification_dismissed_at) = tokio::join!(
            self.read_flag(PreferenceKey::ShowHidden, defaults.show_hidden),
            self.read_flag(PreferenceKey::ShowNames, defaults.show_names),
            self.read_layout(),
            self.avatar_path(),
            self.read_dismissed_at(),
        );

        if dock.len() > self.dock_capacity {
            warn!(
                "독 항목 {}개가 최대치 {}를 넘어 잘라냄",
                dock.len(),
                self.dock_capacity
            );
            dock.truncate(self.dock_capacity);
        }

        // 독과 숨김 양쪽에 있으면 독 우선
        let docked: HashSet<&str> = dock.iter().map(String::as_str).collect();
        let before = hidden.len();
        let hidden: Vec<String> = hidden
            .into_iter()
            .filter(|pkg| !docked.contains(pkg.as_str()))
            .collect();
        if hidden.len() != before {
            warn!("독에 고정된 패키지 {}개를 숨김 목록에서 제외", before - hidden.len());
        }

        debug!(
            "환경설정 로드 완료: hidden={}, dock={}, layout={}",
            hidden.len(),
            dock.len(),
            layout_mode
        );

        Ok(UserPreferences {
            user_name,
            assistant_name,
            hidden_packages: hidden,
            dock_packages: dock,
            show_hidden,
            show_names,
            layout_mode,
            avatar_path,
            notification_dismissed_at,
        })
    }

    async fn save(&self, update: PreferenceUpdate) -> Result<(), CoreError> {
        let key = update.key();
        let bytes = encode(&update)?;
        let path = self.path_for(key);

        write_atomic_async(path, bytes).await?;
        debug!("환경설정 저장: {}", key.file_name());
        Ok(())
    }

    async fn load_avatar(&self) -> Result<Option<Vec<u8>>, CoreError> {
        let Some(text) = self.read_field(PreferenceKey::Avatar).await else {
            return Ok(None);
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        STANDARD
            .decode(text)
            .map(Some)
            .map_err(|e| CoreError::Storage(format!("아바타 디코딩 실패: {e}")))
    }
}
