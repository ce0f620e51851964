//! 설치된 앱 카탈로그.
//!
//! `PackageManager` 포트로 스냅샷을 통째로 교체한다.
//! 조회 실패 시에는 이전 스냅샷을 그대로 유지한다.

use chrono::{DateTime, Utc};
use perch_core::error::CoreError;
use perch_core::models::app::Catalog;
use perch_core::ports::package_manager::PackageManager;
use std::sync::Arc;
use tracing::{debug, warn};

/// 카탈로그 스냅샷과 새로고침 메타데이터
pub struct AppCatalog {
    package_manager: Arc<dyn PackageManager>,
    snapshot: Catalog,
    refreshed_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl AppCatalog {
    /// 빈 카탈로그로 시작
    pub fn new(package_manager: Arc<dyn PackageManager>) -> Self {
        Self {
            package_manager,
            snapshot: Catalog::default(),
            refreshed_at: None,
            generation: 0,
        }
    }

    /// OS에서 앱 목록을 다시 읽어 스냅샷 교체
    ///
    /// 실패하면 이전 스냅샷을 유지하고 에러를 돌려준다.
    pub async fn refresh(&mut self) -> Result<&Catalog, CoreError> {
        let records = match self.package_manager.enumerate_installed_apps().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "앱 목록 조회 실패, 이전 카탈로그 유지 ({}개): {e}",
                    self.snapshot.len()
                );
                return Err(e);
            }
        };

        self.snapshot = Catalog::from_records(records);
        self.refreshed_at = Some(Utc::now());
        self.generation += 1;

        debug!(
            "카탈로그 새로고침 #{}: {}개 앱",
            self.generation,
            self.snapshot.len()
        );
        Ok(&self.snapshot)
    }

    /// 낙관적 제거 (삭제 흐름 시작 직후)
    pub fn remove(&mut self, package_id: &str) -> bool {
        self.snapshot.remove(package_id)
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> &Catalog {
        &self.snapshot
    }

    /// 마지막 성공 새로고침 시각
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// 성공한 새로고침 횟수
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn package_manager(&self) -> &Arc<dyn PackageManager> {
        &self.package_manager
    }
}
