//! PERCH 도메인 모델.
//!
//! 카탈로그, 사용자 환경설정, 플랫폼 이벤트, 위젯 응답 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod app;
pub mod event;
pub mod preferences;
pub mod widgets;
