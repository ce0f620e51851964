//! 카탈로그 새로고침 스케줄링 도구.
//!
//! - `RefreshThrottle`: 최소 간격 안의 트리거를 버린다 (대기열에 넣지 않음)
//! - `DelayedRefresh`: 지연 트리거 하나만 대기시킨다. drop 시 취소

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// 새로고침을 요청한 원인
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// 시작 직후 첫 로드
    Startup,
    /// 패키지 설치/삭제 이벤트
    PackagesChanged,
    /// 포그라운드 복귀
    Foreground,
    /// 삭제 흐름 이후 확인
    PostUninstall,
    /// 사용자 명령
    Manual,
}

/// 새로고침 스로틀
///
/// 첫 호출은 항상 통과하고, 이후에는 마지막 실행으로부터
/// `min_interval` 이상 지났을 때만 통과한다.
#[derive(Debug, Clone)]
pub struct RefreshThrottle {
    min_interval: Duration,
    last_executed: Option<Instant>,
}

impl RefreshThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_executed: None,
        }
    }

    /// `now` 시점에 실행해도 되는지 판단하고, 통과하면 실행 시각 기록
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_executed {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                debug!(
                    "새로고침 스로틀: {}ms 경과 (최소 {}ms)",
                    elapsed.as_millis(),
                    self.min_interval.as_millis()
                );
                return false;
            }
        }
        self.last_executed = Some(now);
        true
    }

    /// 마지막 실행 시각
    pub fn last_executed(&self) -> Option<Instant> {
        self.last_executed
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// 지연 새로고침 타이머
///
/// 대기 중인 타이머는 최대 하나다. 다시 예약하면 이전 것을 취소하고 교체한다.
pub struct DelayedRefresh {
    tx: mpsc::UnboundedSender<RefreshReason>,
    pending: Option<JoinHandle<()>>,
}

impl DelayedRefresh {
    /// 만료 시 `tx`로 원인을 보낸다
    pub fn new(tx: mpsc::UnboundedSender<RefreshReason>) -> Self {
        Self { tx, pending: None }
    }

    /// `delay` 후 새로고침 트리거 예약
    pub fn schedule(&mut self, delay: Duration, reason: RefreshReason) {
        if let Some(previous) = self.pending.take() {
            if !previous.is_finished() {
                debug!("대기 중인 지연 새로고침 교체: {reason:?}");
            }
            previous.abort();
        }

        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // 수신 측이 이미 종료되었으면 무시
            let _ = tx.send(reason);
        }));
    }

    /// 대기 중인 타이머 취소
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// 아직 만료되지 않은 타이머가 있는지
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DelayedRefresh {
    fn drop(&mut self) {
        self.cancel();
    }
}
