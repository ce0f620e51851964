//! 플랫폼 이벤트 모델.

use serde::{Deserialize, Serialize};

/// OS에서 들어오는 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformEvent {
    /// 패키지 설치/삭제 감지 (알 수 있으면 패키지 ID 포함)
    PackagesChanged { package_id: Option<String> },
    /// 런처가 포그라운드로 복귀
    Foreground,
    /// 런처가 백그라운드/비활성으로 전환
    Background,
}
