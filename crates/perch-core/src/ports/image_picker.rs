//! 이미지 선택 포트.

use async_trait::async_trait;

use crate::error::CoreError;

/// 아바타 이미지 선택기
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// 선택한 이미지 바이트 (취소 시 None)
    async fn pick_image(&self) -> Result<Option<Vec<u8>>, CoreError>;
}
