//! 단위 테스트용 포트 목 구현.

use async_trait::async_trait;
use perch_core::error::CoreError;
use perch_core::models::app::AppRecord;
use perch_core::models::preferences::{PreferenceUpdate, UserPreferences};
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::preferences::PreferenceStore;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

pub fn app(id: &str) -> AppRecord {
    AppRecord::new(&id.to_uppercase(), id, "")
}

#[derive(Default)]
pub struct MockPackageManager {
    pub apps: Mutex<Vec<AppRecord>>,
    pub fail_enumeration: AtomicBool,
    pub fail_launch: AtomicBool,
    pub enumerate_calls: AtomicU32,
    pub uninstall_requests: Mutex<Vec<String>>,
    pub launched: Mutex<Vec<String>>,
}

impl MockPackageManager {
    pub fn with_apps(ids: &[&str]) -> Self {
        let pm = Self::default();
        pm.set_apps(ids);
        pm
    }

    pub fn set_apps(&self, ids: &[&str]) {
        *self.apps.lock().unwrap() = ids.iter().map(|id| app(id)).collect();
    }
}

#[async_trait]
impl PackageManager for MockPackageManager {
    async fn enumerate_installed_apps(&self) -> Result<Vec<AppRecord>, CoreError> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(CoreError::Enumeration("package service down".into()));
        }
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn launch_app(&self, package_id: &str) -> Result<(), CoreError> {
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(CoreError::Launch {
                package_id: package_id.to_string(),
                reason: "no launch intent".into(),
            });
        }
        self.launched.lock().unwrap().push(package_id.to_string());
        Ok(())
    }

    fn request_uninstall(&self, package_id: &str) {
        self.uninstall_requests
            .lock()
            .unwrap()
            .push(package_id.to_string());
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub initial: UserPreferences,
    pub saved: Mutex<Vec<PreferenceUpdate>>,
    pub fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn with(initial: UserPreferences) -> Self {
        Self {
            initial,
            ..Default::default()
        }
    }

    /// 마지막으로 저장된 독 목록
    pub fn last_dock(&self) -> Option<Vec<String>> {
        self.saved.lock().unwrap().iter().rev().find_map(|u| match u {
            PreferenceUpdate::DockPackages(list) => Some(list.clone()),
            _ => None,
        })
    }

    /// 마지막으로 저장된 숨김 목록
    pub fn last_hidden(&self) -> Option<Vec<String>> {
        self.saved.lock().unwrap().iter().rev().find_map(|u| match u {
            PreferenceUpdate::HiddenPackages(list) => Some(list.clone()),
            _ => None,
        })
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn load(&self) -> Result<UserPreferences, CoreError> {
        Ok(self.initial.clone())
    }

    async fn save(&self, update: PreferenceUpdate) -> Result<(), CoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("disk full".into()));
        }
        self.saved.lock().unwrap().push(update);
        Ok(())
    }

    async fn load_avatar(&self) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(None)
    }
}
