//! 단위 테스트용 포트 목 구현.

use async_trait::async_trait;
use perch_core::error::CoreError;
use perch_core::models::app::AppRecord;
use perch_core::models::event::PlatformEvent;
use perch_core::models::preferences::{PreferenceUpdate, UserPreferences};
use perch_core::ports::events::EventSource;
use perch_core::ports::notifier::Notifier;
use perch_core::ports::package_manager::PackageManager;
use perch_core::ports::preferences::PreferenceStore;
use perch_core::subscription::Subscription;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// 앱 목록을 바꿀 수 있는 패키지 관리자
#[derive(Default)]
pub struct MockPackageManager {
    apps: Mutex<Vec<AppRecord>>,
    enumerate_calls: AtomicU32,
    pub uninstall_requests: Mutex<Vec<String>>,
}

impl MockPackageManager {
    pub fn with_apps(ids: &[&str]) -> Self {
        let pm = Self::default();
        pm.set_apps(ids);
        pm
    }

    pub fn set_apps(&self, ids: &[&str]) {
        *self.apps.lock().unwrap() = ids
            .iter()
            .map(|id| AppRecord::new(&id.to_uppercase(), id, ""))
            .collect();
    }

    pub fn enumerate_calls(&self) -> u32 {
        self.enumerate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageManager for MockPackageManager {
    async fn enumerate_installed_apps(&self) -> Result<Vec<AppRecord>, CoreError> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.apps.lock().unwrap().clone())
    }

    async fn launch_app(&self, package_id: &str) -> Result<(), CoreError> {
        Err(CoreError::Launch {
            package_id: package_id.to_string(),
            reason: "test".into(),
        })
    }

    fn request_uninstall(&self, package_id: &str) {
        self.uninstall_requests
            .lock()
            .unwrap()
            .push(package_id.to_string());
    }
}

/// 메모리 환경설정 저장소
#[derive(Default)]
pub struct MemoryStore {
    pub initial: UserPreferences,
    pub saved: Mutex<Vec<PreferenceUpdate>>,
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn load(&self) -> Result<UserPreferences, CoreError> {
        Ok(self.initial.clone())
    }

    async fn save(&self, update: PreferenceUpdate) -> Result<(), CoreError> {
        self.saved.lock().unwrap().push(update);
        Ok(())
    }

    async fn load_avatar(&self) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(None)
    }
}

/// 호출 내용을 기록하는 알림기
#[derive(Default)]
pub struct MockNotifier {
    pub notifications: Mutex<Vec<(String, String)>>,
    pub toasts: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn notification_count(&self) -> usize {
        self.notifications.lock().unwrap().len()
    }

    pub fn last_toast(&self) -> Option<String> {
        self.toasts.lock().unwrap().last().cloned()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn show_notification(&self, title: &str, body: &str) -> Result<(), CoreError> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }

    async fn show_toast(&self, message: &str) -> Result<(), CoreError> {
        self.toasts.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn show_error(&self, message: &str) -> Result<(), CoreError> {
        self.errors.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// 테스트에서 직접 이벤트를 넣는 이벤트 소스
#[derive(Default)]
pub struct ManualEvents {
    tx: Mutex<Option<mpsc::UnboundedSender<PlatformEvent>>>,
    pub subscriptions: AtomicU32,
}

impl ManualEvents {
    pub fn emit(&self, event: PlatformEvent) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

impl EventSource for ManualEvents {
    fn subscribe(&self, tx: mpsc::UnboundedSender<PlatformEvent>) -> Subscription {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        *self.tx.lock().unwrap() = Some(tx);
        Subscription::noop("manual-events")
    }
}
