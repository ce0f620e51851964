//! OS 패키지 관리 포트.
//!
//! 구현: `perch-monitor` crate (freedesktop `.desktop` 스캐너)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::app::AppRecord;

/// 설치된 앱 조회/실행/삭제
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// 설치된 앱 목록 (플랫폼 정렬 순서)
    ///
    /// 실패 시 `CoreError::Enumeration`
    async fn enumerate_installed_apps(&self) -> Result<Vec<AppRecord>, CoreError>;

    /// 앱 실행
    ///
    /// 실패 시 `CoreError::Launch`
    async fn launch_app(&self, package_id: &str) -> Result<(), CoreError>;

    /// OS 삭제 흐름 시작 (확인 UI는 OS가 띄운다, 결과를 기다리지 않음)
    fn request_uninstall(&self, package_id: &str);
}
