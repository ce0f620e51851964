//! 플랫폼 이벤트 소스 포트.
//!
//! 구현: `perch-monitor` crate (`InstallWatcher`)

use tokio::sync::mpsc;

use crate::models::event::PlatformEvent;
use crate::subscription::Subscription;

/// 설치 이벤트 / 포그라운드 전환 이벤트 소스
pub trait EventSource: Send + Sync {
    /// 이벤트 구독 시작
    ///
    /// 반환된 `Subscription`이 drop되면 구독이 해제된다.
    fn subscribe(&self, tx: mpsc::UnboundedSender<PlatformEvent>) -> Subscription;
}
