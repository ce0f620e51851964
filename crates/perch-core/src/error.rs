//! PERCH 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 실패를 `CoreError`로 매핑한다.
//! 어떤 에러도 프로세스에 치명적이지 않다. 호출자는 마지막 정상 상태를 유지하고
//! 사용자에게 알린다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "App", "Location")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 환경설정 파일 읽기/쓰기 실패
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// OS 앱 목록 조회 실패 (이전 카탈로그 유지)
    #[error("앱 목록 조회 실패: {0}")]
    Enumeration(String),

    /// 독이 가득 참
    #[error("독이 가득 찼습니다 (최대 {capacity}개)")]
    DockFull {
        /// 독 최대 용량
        capacity: usize,
    },

    /// 앱 실행 실패
    #[error("앱 실행 실패: {package_id}: {reason}")]
    Launch {
        /// 실행하려던 패키지 ID
        package_id: String,
        /// 실패 사유
        reason: String,
    },

    /// 네트워크 에러 (날씨/환율 위젯)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 현재 플랫폼에서 지원하지 않는 기능
    #[error("미지원 기능: {0}")]
    Unsupported(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 사용자에게 토스트로 보여줄 짧은 메시지
    pub fn user_message(&self) -> String {
        match self {
            CoreError::DockFull { capacity } => format!("Dock is full (max {capacity} apps)"),
            CoreError::Launch { .. } => "Cannot Open".to_string(),
            CoreError::Network(_) => "Network request failed.".to_string(),
            CoreError::NotFound { resource_type, .. } if resource_type == "Location" => {
                "Location not found.".to_string()
            }
            other => other.to_string(),
        }
    }
}
