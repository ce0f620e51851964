//! 환경설정 저장소 포트.
//!
//! 구현: `perch-storage` crate (필드별 플랫 파일)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::preferences::{PreferenceUpdate, UserPreferences};

/// 사용자 환경설정 저장소
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// 전체 스냅샷 로드
    ///
    /// 누락되거나 손상된 필드는 기본값으로 채운다.
    /// 저장 디렉토리를 준비할 수 없을 때만 실패한다.
    async fn load(&self) -> Result<UserPreferences, CoreError>;

    /// 필드 하나 저장
    ///
    /// 쓰기는 완전히 끝나거나 이전 값을 그대로 남겨야 한다.
    async fn save(&self, update: PreferenceUpdate) -> Result<(), CoreError>;

    /// 저장된 아바타 이미지 바이트
    async fn load_avatar(&self) -> Result<Option<Vec<u8>>, CoreError>;
}
