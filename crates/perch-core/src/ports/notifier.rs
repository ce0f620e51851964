//! 사용자 알림 포트.
//!
//! 구현: `perch-app` crate (콘솔 알림기)

use async_trait::async_trait;

use crate::error::CoreError;

/// 토스트/알림 표시 인터페이스
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 어시스턴트 알림 표시 (제목 + 본문)
    async fn show_notification(&self, title: &str, body: &str) -> Result<(), CoreError>;

    /// 짧은 토스트 메시지
    async fn show_toast(&self, message: &str) -> Result<(), CoreError>;

    /// 에러 메시지
    async fn show_error(&self, message: &str) -> Result<(), CoreError>;
}
