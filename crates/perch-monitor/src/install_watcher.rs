//! 설치 변화 감지.
//!
//! 앱 디렉토리의 지문(`.desktop` 개수 + 가장 최근 수정 시각)을 주기적으로
//! 비교하여 바뀌면 `PlatformEvent::PackagesChanged`를 보낸다.

use perch_core::config::MonitorConfig;
use perch_core::models::event::PlatformEvent;
use perch_core::ports::events::EventSource;
use perch_core::subscription::Subscription;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::desktop_entries::{default_application_dirs, desktop_files};

/// 디렉토리 집합의 지문
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirFingerprint {
    pub entries: usize,
    pub newest: Option<SystemTime>,
}

impl DirFingerprint {
    /// 디렉토리들의 현재 지문 계산 (읽을 수 없는 디렉토리는 건너뜀)
    pub async fn capture(dirs: &[PathBuf]) -> Self {
        let mut fingerprint = DirFingerprint::default();
        for dir in dirs {
            // 삭제는 디렉토리 mtime에 반영된다
            fingerprint.observe(modified(dir).await);

            let Ok(files) = desktop_files(dir).await else {
                continue;
            };
            fingerprint.entries += files.len();
            for file in &files {
                fingerprint.observe(modified(file).await);
            }
        }
        fingerprint
    }

    fn observe(&mut self, mtime: Option<SystemTime>) {
        if let Some(mtime) = mtime {
            self.newest = Some(self.newest.map_or(mtime, |n| n.max(mtime)));
        }
    }
}

async fn modified(path: &std::path::Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// 폴링 기반 설치 감지기 (EventSource 구현)
pub struct InstallWatcher {
    dirs: Vec<PathBuf>,
    poll_interval: Duration,
}

impl InstallWatcher {
    pub fn new(dirs: Vec<PathBuf>, poll_interval: Duration) -> Self {
        Self {
            dirs,
            poll_interval,
        }
    }

    /// 설정의 디렉토리와 주기 사용
    pub fn from_config(config: &MonitorConfig) -> Self {
        let dirs = if config.application_dirs.is_empty() {
            default_application_dirs()
        } else {
            config.application_dirs.clone()
        };
        Self::new(dirs, Duration::from_secs(config.install_poll_secs))
    }
}

impl EventSource for InstallWatcher {
    /// 폴링 태스크 시작 (tokio 런타임 안에서 호출해야 함)
    fn subscribe(&self, tx: mpsc::UnboundedSender<PlatformEvent>) -> Subscription {
        let dirs = self.dirs.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut last = DirFingerprint::capture(&dirs).await;
            debug!("설치 감지 시작: {}개 항목", last.entries);

            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = DirFingerprint::capture(&dirs).await;
                if current == last {
                    continue;
                }
                info!(
                    "앱 디렉토리 변경 감지: {} → {}개 항목",
                    last.entries, current.entries
                );
                last = current;
                if tx
                    .send(PlatformEvent::PackagesChanged { package_id: None })
                    .is_err()
                {
                    debug!("설치 이벤트 수신자 종료, 감지 중지");
                    break;
                }
            }
        });

        Subscription::from_task("install-watcher", handle)
    }
}
