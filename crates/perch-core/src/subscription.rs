//! 구독 핸들.
//!
//! 이벤트 콜백 등록을 값으로 표현한다. 핸들이 drop되면 (정상 종료, 조기 반환,
//! 패닉 모두) 등록이 해제된다.

use tokio::task::JoinHandle;
use tracing::debug;

type Release = Box<dyn FnOnce() + Send + 'static>;

/// 범위 기반 구독 핸들
#[must_use = "Subscription을 drop하면 즉시 구독이 해제된다"]
pub struct Subscription {
    name: &'static str,
    release: Option<Release>,
}

impl Subscription {
    /// 해제 함수로 핸들 생성
    pub fn new(name: &'static str, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name,
            release: Some(Box::new(release)),
        }
    }

    /// 백그라운드 태스크 기반 구독 (drop 시 abort)
    pub fn from_task(name: &'static str, handle: JoinHandle<()>) -> Self {
        Self::new(name, move || handle.abort())
    }

    /// 아무것도 해제하지 않는 핸들
    pub fn noop(name: &'static str) -> Self {
        Self {
            name,
            release: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 명시적 해제
    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!("구독 해제: {}", self.name);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.release.is_some())
            .finish()
    }
}
